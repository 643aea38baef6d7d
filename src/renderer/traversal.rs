use crate::component::{Component, encode_all};
use crate::context::RenderContext;
use crate::error::RenderError;

/// Encode the children of `component` in declared order.
pub fn render_children<C>(context: &mut RenderContext, component: &C) -> Result<(), RenderError>
where
    C: Component + ?Sized,
{
    let children = component.children();
    for child in children.iter().take(component.child_count()) {
        render_child(context, child.as_ref())?;
    }
    Ok(())
}

/// Encode one node with the same rule the framework uses for a full subtree.
pub fn render_child(context: &mut RenderContext, child: &dyn Component) -> Result<(), RenderError> {
    encode_all(child, context)
}
