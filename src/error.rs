use std::error::Error as StdError;

use thiserror::Error;

/// Failures raised by the host framework collaborators while a view is built
/// or encoded.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("write to response sink failed")]
    Io(#[from] std::fmt::Error),
    #[error("invalid view id `{view_id}`: {reason}")]
    InvalidViewId { view_id: String, reason: String },
    #[error("view `{view_id}` could not be located")]
    ViewNotFound { view_id: String },
    #[error("no view declaration language handles `{view_id}`")]
    NoViewDeclarationLanguage { view_id: String },
    #[error("render kit `{id}` is not registered")]
    UnknownRenderKit { id: String },
    #[error("no supported content type in `{requested}`")]
    UnsupportedContentType { requested: String },
    #[error("unsupported character encoding `{requested}`")]
    UnsupportedEncoding { requested: String },
    #[error("response writer misuse: {message}")]
    Protocol { message: String },
    #[error("template rendering failed")]
    Template(#[from] askama::Error),
    #[error("component `{component}` failed: {message}")]
    Component { component: String, message: String },
}

impl RenderError {
    pub fn invalid_view_id(view_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidViewId {
            view_id: view_id.into(),
            reason: reason.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    pub fn component(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// The single failure surfaced by [`render_view`](crate::render_view).
///
/// No partial markup is carried: callers get either the complete output or
/// this error with the underlying cause attached as its source.
#[derive(Debug, Error)]
#[error("failed to render view `{view_id}`")]
pub struct RenderViewError {
    view_id: String,
    #[source]
    source: RenderError,
}

impl RenderViewError {
    pub fn new(view_id: impl Into<String>, source: RenderError) -> Self {
        Self {
            view_id: view_id.into(),
            source,
        }
    }

    pub fn view_id(&self) -> &str {
        &self.view_id
    }

    pub fn cause(&self) -> &RenderError {
        &self.source
    }

    pub fn into_cause(self) -> RenderError {
        self.source
    }
}

/// Flattened error chain used when logging a failed render.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }
}
