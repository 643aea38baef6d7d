use std::fmt::{self, Write as _};

use super::{ContentType, Encoding, ResponseWriter};
use crate::error::RenderError;

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(name))
}

/// HTML/XHTML serializer over any `fmt::Write` sink.
pub struct HtmlResponseWriter {
    sink: Box<dyn fmt::Write + Send>,
    content_type: ContentType,
    encoding: Encoding,
    open_start_tag: Option<String>,
}

impl HtmlResponseWriter {
    pub fn new(
        sink: Box<dyn fmt::Write + Send>,
        content_type: ContentType,
        encoding: Encoding,
    ) -> Self {
        Self {
            sink,
            content_type,
            encoding,
            open_start_tag: None,
        }
    }

    fn close_start_tag(&mut self) -> Result<(), RenderError> {
        if self.open_start_tag.take().is_some() {
            self.sink.write_char('>')?;
        }
        Ok(())
    }

    fn write_escaped(&mut self, text: &str, in_attribute: bool) -> Result<(), RenderError> {
        let mut escaped = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' if in_attribute => escaped.push_str("&quot;"),
                ch if !self.encoding.can_encode(ch) => {
                    write!(escaped, "&#{};", u32::from(ch))?;
                }
                ch => escaped.push(ch),
            }
        }
        self.sink.write_str(&escaped)?;
        Ok(())
    }

    /// Markup passes through untouched apart from characters the encoding
    /// cannot carry.
    fn write_encoded(&mut self, markup: &str) -> Result<(), RenderError> {
        if markup.chars().all(|ch| self.encoding.can_encode(ch)) {
            self.sink.write_str(markup)?;
            return Ok(());
        }
        for ch in markup.chars() {
            if self.encoding.can_encode(ch) {
                self.sink.write_char(ch)?;
            } else {
                write!(self.sink, "&#{};", u32::from(ch))?;
            }
        }
        Ok(())
    }
}

impl ResponseWriter for HtmlResponseWriter {
    fn content_type(&self) -> ContentType {
        self.content_type
    }

    fn character_encoding(&self) -> Encoding {
        self.encoding
    }

    fn start_element(&mut self, name: &str) -> Result<(), RenderError> {
        self.close_start_tag()?;
        write!(self.sink, "<{name}")?;
        self.open_start_tag = Some(name.to_string());
        Ok(())
    }

    fn write_attribute(&mut self, name: &str, value: &str) -> Result<(), RenderError> {
        if self.open_start_tag.is_none() {
            return Err(RenderError::protocol(format!(
                "attribute `{name}` written outside of a start tag"
            )));
        }
        write!(self.sink, " {name}=\"")?;
        self.write_escaped(value, true)?;
        self.sink.write_char('"')?;
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), RenderError> {
        self.close_start_tag()?;
        self.write_escaped(text, false)
    }

    fn write_comment(&mut self, comment: &str) -> Result<(), RenderError> {
        if comment.contains("-->") {
            return Err(RenderError::protocol("comment body must not contain `-->`"));
        }
        self.close_start_tag()?;
        self.sink.write_str("<!--")?;
        self.write_encoded(comment)?;
        self.sink.write_str("-->")?;
        Ok(())
    }

    fn write_raw(&mut self, markup: &str) -> Result<(), RenderError> {
        self.close_start_tag()?;
        self.write_encoded(markup)
    }

    fn end_element(&mut self, name: &str) -> Result<(), RenderError> {
        let void = is_void_element(name);
        let still_open = self.open_start_tag.as_deref() == Some(name);

        if still_open && void {
            self.open_start_tag = None;
            let close = if self.content_type.is_xml() { " />" } else { ">" };
            self.sink.write_str(close)?;
            return Ok(());
        }

        self.close_start_tag()?;
        if !void {
            write!(self.sink, "</{name}>")?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        self.close_start_tag()
    }
}
