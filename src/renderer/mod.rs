//! Renders views into strings instead of the live response.
//!
//! A render swaps the context's response writer for one backed by a
//! [`CaptureBuffer`], builds the view, encodes its children and puts the
//! original writer back. The swap is guarded, so the original writer is
//! restored even when building or encoding fails.

mod scope;
mod traversal;

pub use scope::WriterScope;
pub use traversal::{render_child, render_children};

use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, instrument, warn};

use crate::component::Component;
use crate::context::RenderContext;
use crate::error::{ErrorReport, RenderError, RenderViewError};
use crate::telemetry::{METRIC_RENDER_DURATION_MS, METRIC_RENDER_TOTAL};
use crate::writer::{CaptureBuffer, ResponseWriter};

/// Borrowing wrapper that renders views against one context.
pub struct ViewRenderer<'a> {
    context: &'a mut RenderContext,
}

impl<'a> ViewRenderer<'a> {
    pub fn new(context: &'a mut RenderContext) -> Self {
        Self { context }
    }

    pub fn render_view(&mut self, view_id: &str) -> Result<String, RenderViewError> {
        render_view(self.context, view_id)
    }

    pub fn render_component(&mut self, component: &dyn Component) -> Result<String, RenderError> {
        render_component(self.context, component)
    }

    pub fn context(&mut self) -> &mut RenderContext {
        self.context
    }
}

/// Render the view named by `view_id` and return its markup.
///
/// The content type and encoding of the capturing writer come from the
/// request attributes named in [`RenderSettings`](crate::RenderSettings);
/// absent attributes leave the choice to the render kit.
#[instrument(skip_all, fields(view_id = %view_id))]
pub fn render_view(context: &mut RenderContext, view_id: &str) -> Result<String, RenderViewError> {
    let started_at = Instant::now();

    let result = capture(context, |context| {
        let view_handler = context.view_handler();
        let mut root = view_handler.create_view(context, view_id)?;
        let language = view_handler.view_declaration_language(context, view_id)?;
        language.build_view(context, &mut root)?;
        render_children(context, &root)
    });

    histogram!(METRIC_RENDER_DURATION_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);

    match result {
        Ok(markup) => {
            counter!(METRIC_RENDER_TOTAL, "outcome" => "ok").increment(1);
            debug!(bytes = markup.len(), "view rendered");
            Ok(markup)
        }
        Err(source) => {
            counter!(METRIC_RENDER_TOTAL, "outcome" => "error").increment(1);
            let error = RenderViewError::new(view_id, source);
            let report = ErrorReport::from_error("renderer::render_view", &error);
            warn!(source = report.source, messages = ?report.messages, "view rendering failed");
            Err(error)
        }
    }
}

/// Render one component subtree, applying the rendered rule to it as well.
pub fn render_component(
    context: &mut RenderContext,
    component: &dyn Component,
) -> Result<String, RenderError> {
    capture(context, |context| render_child(context, component))
}

/// Run `encode` with output redirected into a fresh buffer and return what
/// was written. Nothing is returned when `encode` fails.
pub fn capture<F>(context: &mut RenderContext, encode: F) -> Result<String, RenderError>
where
    F: FnOnce(&mut RenderContext) -> Result<(), RenderError>,
{
    let buffer = CaptureBuffer::new();
    let writer = create_capture_writer(context, &buffer)?;

    {
        let mut scope = WriterScope::install(context, writer);
        encode(&mut *scope)?;
        scope.response_writer_mut()?.flush()?;
    }

    Ok(buffer.take())
}

fn create_capture_writer(
    context: &RenderContext,
    buffer: &CaptureBuffer,
) -> Result<Box<dyn ResponseWriter>, RenderError> {
    let settings = context.settings();
    let attributes = context.request_attributes();
    let content_type = attributes.get(&settings.content_type_attribute);
    let encoding = attributes.get(&settings.encoding_attribute);

    context
        .render_kit()?
        .create_response_writer(Box::new(buffer.clone()), content_type, encoding)
}
