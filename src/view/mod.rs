//! View handling: turning a view id into a populated [`ViewRoot`].

mod language;

pub use language::{ComponentTreeLanguage, ViewBuilder};

use std::{fmt, sync::Arc};

use crate::component::ViewRoot;
use crate::context::RenderContext;
use crate::error::RenderError;

pub trait ViewHandler: Send + Sync {
    /// Create an empty view root for `view_id`.
    fn create_view(&self, context: &RenderContext, view_id: &str)
    -> Result<ViewRoot, RenderError>;

    /// Language responsible for building `view_id`.
    fn view_declaration_language(
        &self,
        context: &RenderContext,
        view_id: &str,
    ) -> Result<Arc<dyn ViewDeclarationLanguage>, RenderError>;
}

pub trait ViewDeclarationLanguage: Send + Sync {
    /// Populate `root` with the component tree of its view. Fails when the
    /// view cannot be located or built.
    fn build_view(&self, context: &mut RenderContext, root: &mut ViewRoot)
    -> Result<(), RenderError>;
}

/// Normalise a view id to its absolute form.
///
/// Leading and trailing whitespace is removed and a leading `/` added; empty
/// ids and ids with `..` segments are rejected.
pub fn normalize_view_id(view_id: &str) -> Result<String, RenderError> {
    let trimmed = view_id.trim();
    if trimmed.is_empty() || trimmed == "/" {
        return Err(RenderError::invalid_view_id(view_id, "view id is empty"));
    }
    if trimmed.split('/').any(|segment| segment == "..") {
        return Err(RenderError::invalid_view_id(
            view_id,
            "parent segments are not allowed",
        ));
    }

    if trimmed.starts_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("/{trimmed}"))
    }
}

/// Dispatches views to declaration languages by file suffix.
#[derive(Default)]
pub struct DefaultViewHandler {
    languages: Vec<(String, Arc<dyn ViewDeclarationLanguage>)>,
}

impl DefaultViewHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle ids ending in `suffix` (e.g. `.xhtml`) with `language`. Earlier
    /// registrations win when several suffixes match.
    pub fn with_language(
        mut self,
        suffix: impl Into<String>,
        language: Arc<dyn ViewDeclarationLanguage>,
    ) -> Self {
        self.languages.push((suffix.into(), language));
        self
    }
}

impl ViewHandler for DefaultViewHandler {
    fn create_view(
        &self,
        _context: &RenderContext,
        view_id: &str,
    ) -> Result<ViewRoot, RenderError> {
        Ok(ViewRoot::new(normalize_view_id(view_id)?))
    }

    fn view_declaration_language(
        &self,
        _context: &RenderContext,
        view_id: &str,
    ) -> Result<Arc<dyn ViewDeclarationLanguage>, RenderError> {
        let normalized = normalize_view_id(view_id)?;
        self.languages
            .iter()
            .find(|(suffix, _)| normalized.ends_with(suffix.as_str()))
            .map(|(_, language)| Arc::clone(language))
            .ok_or(RenderError::NoViewDeclarationLanguage {
                view_id: normalized,
            })
    }
}

impl fmt::Debug for DefaultViewHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffixes: Vec<_> = self.languages.iter().map(|(suffix, _)| suffix).collect();
        f.debug_struct("DefaultViewHandler")
            .field("suffixes", &suffixes)
            .finish()
    }
}
