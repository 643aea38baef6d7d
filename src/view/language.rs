use std::{collections::HashMap, fmt, sync::Arc};

use tracing::debug;

use super::{ViewDeclarationLanguage, normalize_view_id};
use crate::component::ViewRoot;
use crate::context::RenderContext;
use crate::error::RenderError;

/// Populates a view root. Receives the context so builders can consult
/// request attributes.
pub type ViewBuilder =
    Arc<dyn Fn(&RenderContext, &mut ViewRoot) -> Result<(), RenderError> + Send + Sync>;

/// Declaration language backed by registered component-tree builders.
#[derive(Default)]
pub struct ComponentTreeLanguage {
    views: HashMap<String, ViewBuilder>,
}

impl ComponentTreeLanguage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the builder for `view_id`, replacing any previous one.
    pub fn register<F>(&mut self, view_id: &str, builder: F) -> Result<(), RenderError>
    where
        F: Fn(&RenderContext, &mut ViewRoot) -> Result<(), RenderError> + Send + Sync + 'static,
    {
        let view_id = normalize_view_id(view_id)?;
        self.views.insert(view_id, Arc::new(builder));
        Ok(())
    }

    pub fn contains(&self, view_id: &str) -> bool {
        normalize_view_id(view_id)
            .map(|id| self.views.contains_key(&id))
            .unwrap_or(false)
    }
}

impl ViewDeclarationLanguage for ComponentTreeLanguage {
    fn build_view(
        &self,
        context: &mut RenderContext,
        root: &mut ViewRoot,
    ) -> Result<(), RenderError> {
        if root.is_built() {
            return Ok(());
        }

        let builder = self
            .views
            .get(root.view_id())
            .ok_or_else(|| RenderError::ViewNotFound {
                view_id: root.view_id().to_string(),
            })?;

        builder(&*context, &mut *root)?;
        root.mark_built();
        debug!(view_id = root.view_id(), "component tree built");
        Ok(())
    }
}

impl fmt::Debug for ComponentTreeLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.views.keys().collect();
        ids.sort();
        f.debug_struct("ComponentTreeLanguage")
            .field("views", &ids)
            .finish()
    }
}
