use std::{fmt, str::FromStr};

use crate::error::RenderError;

/// Character encodings a response writer can serialize for.
///
/// Rendered output is always returned as a Rust `String`; the encoding only
/// decides which characters are written literally and which become numeric
/// character references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
    Utf16,
    Latin1,
    Ascii,
}

impl Encoding {
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16 => "UTF-16",
            Encoding::Latin1 => "ISO-8859-1",
            Encoding::Ascii => "US-ASCII",
        }
    }

    /// Whether `ch` can be written without a character reference.
    pub fn can_encode(self, ch: char) -> bool {
        match self {
            Encoding::Utf8 | Encoding::Utf16 => true,
            Encoding::Latin1 => u32::from(ch) <= 0xFF,
            Encoding::Ascii => ch.is_ascii(),
        }
    }
}

impl FromStr for Encoding {
    type Err = RenderError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "utf-16" | "utf16" => Ok(Encoding::Utf16),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Ok(Encoding::Latin1),
            "us-ascii" | "ascii" => Ok(Encoding::Ascii),
            _ => Err(RenderError::UnsupportedEncoding {
                requested: label.to_string(),
            }),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
