//! Logging init: console plus an append-mode file under the base path.
//!
//! Both sinks share one line layout, `<RFC 3339 timestamp> <LEVEL> <message>`.

use crate::config::Config;
use crate::error::{Error, Result};
use std::fmt;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{Event, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

/// Event formatter producing `<timestamp> <LEVEL> <message>` lines
#[derive(Debug, Default, Clone, Copy)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        write!(writer, "{} {} ", timestamp, event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn line_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_ansi(false)
        .with_writer(writer)
}

/// Install the global subscriber writing to stdout and [`Config::log_file`]
///
/// The base path is created if missing. The filter comes from `RUST_LOG` and
/// defaults to `info`. Returns the log file path.
pub fn init_logging(config: &Config) -> Result<PathBuf> {
    let base_path = &config.base_path;
    std::fs::create_dir_all(base_path).map_err(|e| Error::io(base_path, e))?;

    let log_path = config.log_file();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| Error::io(&log_path, e))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(line_layer(std::io::stdout))
        .with(line_layer(Mutex::new(file)))
        .try_init()
        .map_err(|e| Error::Config {
            message: format!("logging already initialized: {}", e),
            key: None,
        })?;

    tracing::debug!("logging initialized at {}", log_path.display());

    Ok(log_path)
}
