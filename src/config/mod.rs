//! Configuration layer: typed settings with layered precedence (file → env).

use std::{path::Path, str::FromStr};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::writer::{ContentType, Encoding};

const DEFAULT_CONFIG_BASENAME: &str = "config/offstage";
const ENV_PREFIX: &str = "OFFSTAGE";
pub const DEFAULT_CONTENT_TYPE_ATTRIBUTE: &str = "facelets.ContentType";
pub const DEFAULT_ENCODING_ATTRIBUTE: &str = "facelets.Encoding";
const DEFAULT_CONTENT_TYPE: ContentType = ContentType::Html;
const DEFAULT_ENCODING: Encoding = Encoding::Utf8;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub render: RenderSettings,
    pub logging: LoggingSettings,
}

/// Controls how a captured response writer is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    /// Request attribute holding the requested content type.
    pub content_type_attribute: String,
    /// Request attribute holding the requested character encoding.
    pub encoding_attribute: String,
    /// Used by the render kit when no content type is requested.
    pub default_content_type: ContentType,
    /// Used by the render kit when no encoding is requested.
    pub default_encoding: Encoding,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            content_type_attribute: DEFAULT_CONTENT_TYPE_ATTRIBUTE.to_string(),
            encoding_attribute: DEFAULT_ENCODING_ATTRIBUTE.to_string(),
            default_content_type: DEFAULT_CONTENT_TYPE,
            default_encoding: DEFAULT_ENCODING,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment).
///
/// `path`, when given, must exist; the default `config/offstage` file is
/// optional.
pub fn load(path: Option<&Path>) -> Result<Settings, LoadError> {
    let mut builder =
        Config::builder().add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false));

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let raw: RawSettings = builder.build()?.try_deserialize()?;
    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    render: RawRenderSettings,
    logging: RawLoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    content_type_attribute: Option<String>,
    encoding_attribute: Option<String>,
    default_content_type: Option<String>,
    default_encoding: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings { render, logging } = raw;

        Ok(Self {
            render: build_render_settings(render)?,
            logging: build_logging_settings(logging)?,
        })
    }
}

fn build_render_settings(render: RawRenderSettings) -> Result<RenderSettings, LoadError> {
    let content_type_attribute = attribute_name(
        render.content_type_attribute,
        DEFAULT_CONTENT_TYPE_ATTRIBUTE,
        "render.content_type_attribute",
    )?;
    let encoding_attribute = attribute_name(
        render.encoding_attribute,
        DEFAULT_ENCODING_ATTRIBUTE,
        "render.encoding_attribute",
    )?;

    let default_content_type = match render.default_content_type {
        Some(value) => ContentType::from_str(&value)
            .map_err(|err| LoadError::invalid("render.default_content_type", err.to_string()))?,
        None => DEFAULT_CONTENT_TYPE,
    };
    let default_encoding = match render.default_encoding {
        Some(value) => Encoding::from_str(&value)
            .map_err(|err| LoadError::invalid("render.default_encoding", err.to_string()))?,
        None => DEFAULT_ENCODING,
    };

    Ok(RenderSettings {
        content_type_attribute,
        encoding_attribute,
        default_content_type,
        default_encoding,
    })
}

fn attribute_name(
    value: Option<String>,
    default: &str,
    key: &'static str,
) -> Result<String, LoadError> {
    match value {
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(LoadError::invalid(key, "attribute name must not be blank"));
            }
            Ok(trimmed.to_string())
        }
        None => Ok(default.to_string()),
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}
