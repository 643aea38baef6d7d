//! Render kits create response writers for a resolved content type and
//! character encoding.

use std::{collections::HashMap, fmt, str::FromStr, sync::Arc};

use tracing::trace;

use crate::config::RenderSettings;
use crate::error::RenderError;
use crate::writer::{ContentType, Encoding, HtmlResponseWriter, ResponseWriter};

/// Identifier of the kit registered by default.
pub const HTML_BASIC_RENDER_KIT_ID: &str = "HTML_BASIC";

pub trait RenderKit: Send + Sync {
    /// Create a writer over `sink`. `None` for either parameter selects the
    /// kit's own default.
    fn create_response_writer(
        &self,
        sink: Box<dyn fmt::Write + Send>,
        content_type: Option<&str>,
        encoding: Option<&str>,
    ) -> Result<Box<dyn ResponseWriter>, RenderError>;
}

/// Kit producing [`HtmlResponseWriter`]s.
#[derive(Debug, Clone)]
pub struct HtmlRenderKit {
    default_content_type: ContentType,
    default_encoding: Encoding,
}

impl HtmlRenderKit {
    pub fn new(default_content_type: ContentType, default_encoding: Encoding) -> Self {
        Self {
            default_content_type,
            default_encoding,
        }
    }

    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self::new(settings.default_content_type, settings.default_encoding)
    }

    /// Pick the first supported entry of a comma-separated content type list.
    pub fn negotiate_content_type(&self, requested: &str) -> Result<ContentType, RenderError> {
        for entry in requested.split(',') {
            let essence = entry.split(';').next().unwrap_or_default().trim();
            if essence == "*/*" {
                return Ok(self.default_content_type);
            }
            if let Ok(content_type) = ContentType::from_str(essence) {
                return Ok(content_type);
            }
        }
        Err(RenderError::UnsupportedContentType {
            requested: requested.to_string(),
        })
    }
}

impl Default for HtmlRenderKit {
    fn default() -> Self {
        Self::from_settings(&RenderSettings::default())
    }
}

impl RenderKit for HtmlRenderKit {
    fn create_response_writer(
        &self,
        sink: Box<dyn fmt::Write + Send>,
        content_type: Option<&str>,
        encoding: Option<&str>,
    ) -> Result<Box<dyn ResponseWriter>, RenderError> {
        let content_type = match content_type {
            Some(requested) => self.negotiate_content_type(requested)?,
            None => self.default_content_type,
        };
        let encoding = match encoding {
            Some(requested) => Encoding::from_str(requested)?,
            None => self.default_encoding,
        };

        trace!(%content_type, %encoding, "creating html response writer");
        Ok(Box::new(HtmlResponseWriter::new(
            sink,
            content_type,
            encoding,
        )))
    }
}

/// Render kits keyed by id.
#[derive(Clone, Default)]
pub struct RenderKitRegistry {
    kits: HashMap<String, Arc<dyn RenderKit>>,
}

impl RenderKitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only the HTML kit under [`HTML_BASIC_RENDER_KIT_ID`].
    pub fn with_html_basic(settings: &RenderSettings) -> Self {
        let mut registry = Self::new();
        registry.register(
            HTML_BASIC_RENDER_KIT_ID,
            Arc::new(HtmlRenderKit::from_settings(settings)),
        );
        registry
    }

    /// Register `kit`, replacing any kit already under `id`.
    pub fn register(&mut self, id: impl Into<String>, kit: Arc<dyn RenderKit>) {
        self.kits.insert(id.into(), kit);
    }

    pub fn get(&self, id: &str) -> Result<Arc<dyn RenderKit>, RenderError> {
        self.kits
            .get(id)
            .cloned()
            .ok_or_else(|| RenderError::UnknownRenderKit { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.kits.contains_key(id)
    }
}

impl fmt::Debug for RenderKitRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.kits.keys().collect();
        ids.sort();
        f.debug_struct("RenderKitRegistry").field("kits", &ids).finish()
    }
}
