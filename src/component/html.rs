use super::Component;
use crate::context::RenderContext;
use crate::error::RenderError;

/// Escaped character data.
#[derive(Debug, Clone)]
pub struct Text {
    value: String,
    rendered: bool,
}

impl Text {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            rendered: true,
        }
    }

    pub fn with_rendered(mut self, rendered: bool) -> Self {
        self.rendered = rendered;
        self
    }
}

impl Component for Text {
    fn is_rendered(&self) -> bool {
        self.rendered
    }

    fn encode_begin(&self, context: &mut RenderContext) -> Result<(), RenderError> {
        context.response_writer_mut()?.write_text(&self.value)
    }
}

/// Markup written verbatim.
#[derive(Debug, Clone)]
pub struct Markup {
    markup: String,
    rendered: bool,
}

impl Markup {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            rendered: true,
        }
    }

    pub fn with_rendered(mut self, rendered: bool) -> Self {
        self.rendered = rendered;
        self
    }
}

impl Component for Markup {
    fn is_rendered(&self) -> bool {
        self.rendered
    }

    fn encode_begin(&self, context: &mut RenderContext) -> Result<(), RenderError> {
        context.response_writer_mut()?.write_raw(&self.markup)
    }
}

/// Element with ordered attributes and children.
pub struct Element {
    id: Option<String>,
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Box<dyn Component>>,
    rendered: bool,
    renders_children: bool,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: None,
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            rendered: true,
            renders_children: false,
        }
    }

    /// Sets the component id, which is also written as the `id` attribute.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn child(mut self, child: impl Component + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }

    pub fn with_rendered(mut self, rendered: bool) -> Self {
        self.rendered = rendered;
        self
    }

    /// Encode children through [`Component::encode_children`] rather than
    /// letting the renderer walk them.
    pub fn rendering_children(mut self, renders_children: bool) -> Self {
        self.renders_children = renders_children;
        self
    }
}

impl Component for Element {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn is_rendered(&self) -> bool {
        self.rendered
    }

    fn children(&self) -> &[Box<dyn Component>] {
        &self.children
    }

    fn renders_children(&self) -> bool {
        self.renders_children
    }

    fn encode_begin(&self, context: &mut RenderContext) -> Result<(), RenderError> {
        let writer = context.response_writer_mut()?;
        writer.start_element(&self.tag)?;
        if let Some(id) = self.id.as_deref() {
            writer.write_attribute("id", id)?;
        }
        for (name, value) in &self.attributes {
            writer.write_attribute(name, value)?;
        }
        Ok(())
    }

    fn encode_end(&self, context: &mut RenderContext) -> Result<(), RenderError> {
        context.response_writer_mut()?.end_element(&self.tag)
    }
}
