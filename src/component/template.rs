use askama::Template;

use super::Component;
use crate::context::RenderContext;
use crate::error::RenderError;

/// Leaf that renders an askama template into the active writer.
pub struct TemplateFragment<T> {
    template: T,
    rendered: bool,
}

impl<T: Template + Send> TemplateFragment<T> {
    pub fn new(template: T) -> Self {
        Self {
            template,
            rendered: true,
        }
    }

    pub fn with_rendered(mut self, rendered: bool) -> Self {
        self.rendered = rendered;
        self
    }
}

impl<T: Template + Send> Component for TemplateFragment<T> {
    fn is_rendered(&self) -> bool {
        self.rendered
    }

    fn encode_begin(&self, context: &mut RenderContext) -> Result<(), RenderError> {
        let markup = self.template.render()?;
        context.response_writer_mut()?.write_raw(&markup)
    }
}
