//! Tracing subscriber setup for the importer and its binary.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::{LogFormat, LoggerSettings};
use crate::{Error, Result};

const MODULES: &[&str] = &["ontology_importer"];

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. The returned guard
/// flushes the log file when dropped and must be kept alive for the run.
pub fn init(settings: &LoggerSettings) -> Result<Option<WorkerGuard>> {
    if !settings.enable {
        return Ok(None);
    }

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let mut guard = None;

    if let Some(file) = &settings.file {
        let directory = file.parent().unwrap_or_else(|| Path::new("."));
        let file_name = file.file_name().ok_or_else(|| {
            Error::Configuration(format!("log file `{}` has no file name", file.display()))
        })?;
        let appender = tracing_appender::rolling::never(directory, file_name);
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        layers.push(fmt_layer(writer, settings.format, false));
        guard = Some(file_guard);
    }
    layers.push(fmt_layer(std::io::stdout, settings.format, true));

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            let directives = MODULES
                .iter()
                .map(|module| format!("{module}={}", settings.level))
                .collect::<Vec<_>>()
                .join(",");
            EnvFilter::try_new(directives)
        })
        .map_err(|err| Error::Configuration(format!("invalid log filter: {err}")))?;

    // A subscriber installed earlier (tests, embedding applications) stays in place.
    let _ = tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init();
    Ok(guard)
}

fn fmt_layer<W>(writer: W, format: LogFormat, ansi: bool) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(ansi)
        .with_writer(writer);
    match format {
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::init;
    use crate::config::LoggerSettings;

    #[test]
    fn disabled_logger_installs_nothing() {
        let settings = LoggerSettings {
            enable: false,
            ..LoggerSettings::default()
        };
        assert!(init(&settings).expect("init").is_none());
    }
}
