//! Response writers: the output sinks components encode into.

mod buffer;
mod charset;
mod content_type;
mod html;

pub use buffer::CaptureBuffer;
pub use charset::Encoding;
pub use content_type::ContentType;
pub use html::HtmlResponseWriter;

use crate::error::RenderError;

/// Serializer that components write their markup through.
///
/// The active writer lives on the [`RenderContext`](crate::RenderContext);
/// components never hold on to it between calls.
pub trait ResponseWriter: Send {
    fn content_type(&self) -> ContentType;

    fn character_encoding(&self) -> Encoding;

    /// Open an element. The start tag stays open until content, a child
    /// element, or the matching end tag is written, so attributes may follow.
    fn start_element(&mut self, name: &str) -> Result<(), RenderError>;

    fn write_attribute(&mut self, name: &str, value: &str) -> Result<(), RenderError>;

    /// Write escaped character data.
    fn write_text(&mut self, text: &str) -> Result<(), RenderError>;

    fn write_comment(&mut self, comment: &str) -> Result<(), RenderError>;

    /// Write markup verbatim.
    fn write_raw(&mut self, markup: &str) -> Result<(), RenderError>;

    fn end_element(&mut self, name: &str) -> Result<(), RenderError>;

    fn flush(&mut self) -> Result<(), RenderError>;
}
