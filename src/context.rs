//! Request-scoped rendering context and the application services behind it.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::config::RenderSettings;
use crate::error::RenderError;
use crate::render_kit::{HTML_BASIC_RENDER_KIT_ID, RenderKit, RenderKitRegistry};
use crate::view::{DefaultViewHandler, ViewHandler};
use crate::writer::ResponseWriter;

/// Application-wide services shared by every request context.
pub struct Application {
    view_handler: Arc<dyn ViewHandler>,
    render_kits: RenderKitRegistry,
    settings: RenderSettings,
}

impl Application {
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::default()
    }

    pub fn view_handler(&self) -> Arc<dyn ViewHandler> {
        Arc::clone(&self.view_handler)
    }

    pub fn render_kits(&self) -> &RenderKitRegistry {
        &self.render_kits
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("render_kits", &self.render_kits)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct ApplicationBuilder {
    view_handler: Option<Arc<dyn ViewHandler>>,
    render_kits: Vec<(String, Arc<dyn RenderKit>)>,
    settings: Option<RenderSettings>,
}

impl ApplicationBuilder {
    pub fn view_handler(mut self, view_handler: Arc<dyn ViewHandler>) -> Self {
        self.view_handler = Some(view_handler);
        self
    }

    /// Register an additional kit, or replace the HTML one by passing
    /// [`HTML_BASIC_RENDER_KIT_ID`].
    pub fn render_kit(mut self, id: impl Into<String>, kit: Arc<dyn RenderKit>) -> Self {
        self.render_kits.push((id.into(), kit));
        self
    }

    pub fn settings(mut self, settings: RenderSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn build(self) -> Application {
        let settings = self.settings.unwrap_or_default();
        let mut render_kits = RenderKitRegistry::with_html_basic(&settings);
        for (id, kit) in self.render_kits {
            render_kits.register(id, kit);
        }
        let view_handler = self
            .view_handler
            .unwrap_or_else(|| Arc::new(DefaultViewHandler::new()));

        Application {
            view_handler,
            render_kits,
            settings,
        }
    }
}

/// String-keyed attributes scoped to the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestAttributes {
    values: HashMap<String, String>,
}

impl RequestAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// Per-request handle carrying the active response writer.
///
/// Rendering borrows the context mutably, so two renders can never overlap on
/// the same context; use one context per concurrent request.
pub struct RenderContext {
    application: Arc<Application>,
    attributes: RequestAttributes,
    render_kit_id: String,
    response_writer: Option<Box<dyn ResponseWriter>>,
}

impl RenderContext {
    pub fn new(application: Arc<Application>) -> Self {
        Self {
            application,
            attributes: RequestAttributes::new(),
            render_kit_id: HTML_BASIC_RENDER_KIT_ID.to_string(),
            response_writer: None,
        }
    }

    pub fn with_attributes(mut self, attributes: RequestAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn application(&self) -> &Arc<Application> {
        &self.application
    }

    pub fn settings(&self) -> &RenderSettings {
        self.application.settings()
    }

    pub fn view_handler(&self) -> Arc<dyn ViewHandler> {
        self.application.view_handler()
    }

    pub fn request_attributes(&self) -> &RequestAttributes {
        &self.attributes
    }

    pub fn request_attributes_mut(&mut self) -> &mut RequestAttributes {
        &mut self.attributes
    }

    pub fn render_kit_id(&self) -> &str {
        &self.render_kit_id
    }

    pub fn set_render_kit_id(&mut self, id: impl Into<String>) {
        self.render_kit_id = id.into();
    }

    /// Kit registered under the context's current render-kit id.
    pub fn render_kit(&self) -> Result<Arc<dyn RenderKit>, RenderError> {
        self.application.render_kits().get(&self.render_kit_id)
    }

    pub fn response_writer(&self) -> Option<&(dyn ResponseWriter + 'static)> {
        self.response_writer.as_deref()
    }

    /// The active writer, or a protocol error when nothing is installed.
    pub fn response_writer_mut(
        &mut self,
    ) -> Result<&mut (dyn ResponseWriter + 'static), RenderError> {
        self.response_writer
            .as_deref_mut()
            .ok_or_else(|| RenderError::protocol("no response writer is active"))
    }

    /// Install `writer`, returning the one it replaces.
    pub fn set_response_writer(
        &mut self,
        writer: Option<Box<dyn ResponseWriter>>,
    ) -> Option<Box<dyn ResponseWriter>> {
        std::mem::replace(&mut self.response_writer, writer)
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("attributes", &self.attributes)
            .field("render_kit_id", &self.render_kit_id)
            .field("has_response_writer", &self.response_writer.is_some())
            .finish_non_exhaustive()
    }
}
