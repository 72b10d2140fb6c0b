//! Console logging for processes embedding the engine
//!
//! Output format: `2025-12-02T00:50:44.809Z [INFO] alarm: Alarm state changed expression=...`
//!
//! The component is the last path segment of the event target, so events from
//! `thresh_engine::alarm`, `thresh_stats::window` and `thresh_expr::compiler` read
//! as `alarm`, `window` and `compiler`.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::error::{EngineError, Result};

/// Bracketed label and ANSI color of a level
fn level_style(level: Level) -> (&'static str, &'static str) {
    match level {
        Level::TRACE => ("[TRACE]", "\x1b[35m"),
        Level::DEBUG => ("[DEBUG]", "\x1b[34m"),
        Level::INFO => ("[INFO]", "\x1b[32m"),
        Level::WARN => ("[WARN]", "\x1b[33m"),
        Level::ERROR => ("[ERROR]", "\x1b[31m"),
    }
}

/// Module name of an event target without its crate path
fn component(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

/// Event formatter writing `timestamp [LEVEL] component: message fields`
pub struct AlarmLogFormat;

impl<S, N> FormatEvent<S, N> for AlarmLogFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let (label, color) = level_style(*metadata.level());

        write!(writer, "{} ", chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"))?;
        if writer.has_ansi_escapes() {
            write!(writer, "{}{}\x1b[0m ", color, label)?;
        } else {
            write!(writer, "{} ", label)?;
        }
        write!(writer, "{}: ", component(metadata.target()))?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn parse_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level)
        .map_err(|e| EngineError::config(format!("Invalid log level '{}': {}", level, e)))
}

/// Install the global subscriber.
///
/// `level` is a level or a full filter spec (e.g. `info,thresh_engine=debug`);
/// `RUST_LOG` takes precedence when set.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(env_filter) if !env_filter.trim().is_empty() => parse_filter(&env_filter)?,
        _ => parse_filter(level)?,
    };

    let console_layer = fmt::layer()
        .with_ansi(true)
        .event_format(AlarmLogFormat);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init()
        .map_err(|e| EngineError::config(format!("Failed to initialize logging: {}", e)))
}
