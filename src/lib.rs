//! Render server-side views into strings, outside the live response.
//!
//! Given a [`RenderContext`] for the request being processed and a view id,
//! [`render_view`] builds the view with the context's view handler and
//! encodes its component tree into an in-memory buffer. The context's active
//! response writer is swapped for the duration of the call and always put
//! back afterwards. Typical uses are email bodies and HTML fragments built
//! from the same views that serve pages.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use offstage::{
//!     Application, ComponentTreeLanguage, DefaultViewHandler, Element, RenderContext, Text,
//!     render_view,
//! };
//!
//! let mut views = ComponentTreeLanguage::new();
//! views.register("/mail/welcome.xhtml", |_, root| {
//!     root.push(Element::new("p").child(Text::new("Welcome aboard")));
//!     Ok(())
//! })?;
//!
//! let handler = DefaultViewHandler::new().with_language(".xhtml", Arc::new(views));
//! let application = Arc::new(Application::builder().view_handler(Arc::new(handler)).build());
//!
//! let mut context = RenderContext::new(application);
//! let html = render_view(&mut context, "/mail/welcome.xhtml")?;
//! assert_eq!(html, "<p>Welcome aboard</p>");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod component;
pub mod config;
pub mod context;
pub mod error;
pub mod render_kit;
pub mod renderer;
pub mod telemetry;
pub mod view;
pub mod writer;

pub use crate::component::{
    Component, Element, Markup, TemplateFragment, Text, ViewRoot, encode_all,
};
pub use crate::config::{LoggingSettings, RenderSettings, Settings};
pub use crate::context::{Application, ApplicationBuilder, RenderContext, RequestAttributes};
pub use crate::error::{ErrorReport, RenderError, RenderViewError};
pub use crate::render_kit::{HTML_BASIC_RENDER_KIT_ID, HtmlRenderKit, RenderKit, RenderKitRegistry};
pub use crate::renderer::{ViewRenderer, WriterScope, capture, render_component, render_view};
pub use crate::view::{
    ComponentTreeLanguage, DefaultViewHandler, ViewDeclarationLanguage, ViewHandler,
    normalize_view_id,
};
pub use crate::writer::{CaptureBuffer, ContentType, Encoding, HtmlResponseWriter, ResponseWriter};
