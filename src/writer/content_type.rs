use std::{fmt, str::FromStr};

use crate::error::RenderError;

/// Markup content types the HTML render kit can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Html,
    Xhtml,
    ApplicationXml,
    TextXml,
}

impl ContentType {
    pub fn mime(self) -> &'static str {
        match self {
            ContentType::Html => "text/html",
            ContentType::Xhtml => "application/xhtml+xml",
            ContentType::ApplicationXml => "application/xml",
            ContentType::TextXml => "text/xml",
        }
    }

    /// XML flavours self-close void elements (`<br />`).
    pub fn is_xml(self) -> bool {
        !matches!(self, ContentType::Html)
    }
}

impl FromStr for ContentType {
    type Err = RenderError;

    /// Parse a single media type, ignoring parameters such as `;q=0.9`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let essence = value.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "text/html" => Ok(ContentType::Html),
            "application/xhtml+xml" => Ok(ContentType::Xhtml),
            "application/xml" => Ok(ContentType::ApplicationXml),
            "text/xml" => Ok(ContentType::TextXml),
            _ => Err(RenderError::UnsupportedContentType {
                requested: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}
