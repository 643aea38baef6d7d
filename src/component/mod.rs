//! View-tree nodes.
//!
//! [`Component`] is the whole contract the renderer relies on: whether a node
//! is rendered, its ordered children, whether it encodes those children
//! itself, and the three encode phases. Concrete node kinds are opaque to the
//! traversal.

mod html;
mod template;

pub use html::{Element, Markup, Text};
pub use template::TemplateFragment;

use tracing::trace;

use crate::context::RenderContext;
use crate::error::RenderError;
use crate::renderer::render_children;

pub trait Component: Send {
    fn id(&self) -> Option<&str> {
        None
    }

    /// Unrendered nodes are skipped together with their whole subtree.
    fn is_rendered(&self) -> bool {
        true
    }

    fn children(&self) -> &[Box<dyn Component>] {
        &[]
    }

    fn child_count(&self) -> usize {
        self.children().len()
    }

    /// When true the renderer calls [`encode_children`](Self::encode_children)
    /// once instead of walking the children itself.
    fn renders_children(&self) -> bool {
        false
    }

    fn encode_begin(&self, context: &mut RenderContext) -> Result<(), RenderError>;

    /// Encodes each rendered child with [`encode_all`].
    fn encode_children(&self, context: &mut RenderContext) -> Result<(), RenderError> {
        for child in self.children().iter().take(self.child_count()) {
            encode_all(child.as_ref(), context)?;
        }
        Ok(())
    }

    fn encode_end(&self, _context: &mut RenderContext) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Encode `component` and its whole subtree: begin, then either its own
/// `encode_children` or a walk of its children, then end. Unrendered nodes
/// produce nothing.
pub fn encode_all(
    component: &dyn Component,
    context: &mut RenderContext,
) -> Result<(), RenderError> {
    if !component.is_rendered() {
        trace!(
            component = component.id().unwrap_or("<anonymous>"),
            "skipping unrendered subtree"
        );
        return Ok(());
    }

    component.encode_begin(context)?;
    if component.renders_children() {
        component.encode_children(context)?;
    } else {
        render_children(context, component)?;
    }
    component.encode_end(context)
}

/// Root of a view tree. The root itself produces no markup; only its
/// descendants are encoded.
#[derive(Default)]
pub struct ViewRoot {
    view_id: String,
    children: Vec<Box<dyn Component>>,
    built: bool,
}

impl ViewRoot {
    pub fn new(view_id: impl Into<String>) -> Self {
        Self {
            view_id: view_id.into(),
            children: Vec::new(),
            built: false,
        }
    }

    pub fn view_id(&self) -> &str {
        &self.view_id
    }

    pub fn push(&mut self, child: impl Component + 'static) {
        self.children.push(Box::new(child));
    }

    pub fn push_boxed(&mut self, child: Box<dyn Component>) {
        self.children.push(child);
    }

    /// Whether a declaration language has already populated this root.
    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn mark_built(&mut self) {
        self.built = true;
    }
}

impl Component for ViewRoot {
    fn id(&self) -> Option<&str> {
        Some(&self.view_id)
    }

    fn children(&self) -> &[Box<dyn Component>] {
        &self.children
    }

    fn encode_begin(&self, _context: &mut RenderContext) -> Result<(), RenderError> {
        Ok(())
    }
}
