use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use thiserror::Error;
use tracing::{Subscriber, level_filters::LevelFilter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LoggingSettings};

pub const METRIC_RENDER_TOTAL: &str = "offstage_render_total";
pub const METRIC_RENDER_DURATION_MS: &str = "offstage_render_duration_ms";

static METRIC_DESCRIPTIONS: Once = Once::new();

#[derive(Debug, Error)]
#[error("telemetry initialization failed: {0}")]
pub struct TelemetryError(String);

/// Install a global tracing subscriber using the provided logging settings.
///
/// Hosts that already configure tracing should skip this; installing twice
/// fails.
pub fn init(logging: &LoggingSettings) -> Result<(), TelemetryError> {
    describe_metrics();
    subscriber(logging.level, logging.format)
        .try_init()
        .map_err(|err| TelemetryError(format!("failed to install tracing subscriber: {err}")))
}

/// Subscriber for one log format. `RUST_LOG` directives override `level`.
///
/// Only one of the two formatting layers is ever present.
fn subscriber(level: LevelFilter, format: LogFormat) -> impl Subscriber + Send + Sync + 'static {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let json = (format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
    });
    let compact = (format == LogFormat::Compact).then(|| fmt::layer().compact());

    tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default())
        .with(json)
        .with(compact)
}

/// Register descriptions for the metrics emitted by the renderer.
pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_RENDER_TOTAL,
            Unit::Count,
            "Total number of views rendered into strings, labelled by outcome."
        );
        describe_histogram!(
            METRIC_RENDER_DURATION_MS,
            Unit::Milliseconds,
            "Time spent building and encoding a captured view."
        );
    });
}
