use std::fs::OpenOptions;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt};

use crate::Result;
use crate::error::Error;

/// Initialise tracing with an optional filter, an optional append-only log
/// file and a conditional JSON mode.
///
/// Events go to `log_file` when given, otherwise to stderr. The returned
/// guard flushes the file writer on drop and must be held until exit.
///
/// # Errors
///
/// Returns an error if the filter is invalid, if the log file cannot be
/// opened for appending, if JSON output is requested without the
/// `json-logs` feature, or if the global subscriber is already set.
pub fn init_tracing(
    explicit_filter: Option<&str>,
    use_json: bool,
    log_file: Option<&Path>,
) -> Result<Option<WorkerGuard>> {
    let mut filter_candidates = Vec::new();
    if let Some(f) = explicit_filter {
        filter_candidates.push(f.to_string());
    }
    if let Ok(env) = std::env::var("RUST_LOG") {
        filter_candidates.push(env);
    }
    filter_candidates.push("info".to_string());

    let filter = filter_candidates
        .into_iter()
        .find_map(|candidate| EnvFilter::try_new(candidate).ok())
        .ok_or_else(|| Error::Telemetry("invalid log filter".to_string()))?;

    let (writer, guard, ansi) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| {
                    Error::Telemetry(format!("cannot open log file {}: {err}", path.display()))
                })?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            (BoxMakeWriter::new(non_blocking), Some(guard), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), None, true),
    };

    #[cfg(feature = "json-logs")]
    if use_json {
        let subscriber = Registry::default().with(filter).with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .json()
                .flatten_event(true),
        );
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|err| Error::Telemetry(err.to_string()))?;
        return Ok(guard);
    }

    #[cfg(not(feature = "json-logs"))]
    if use_json {
        return Err(Error::Telemetry(
            "binary was built without the `json-logs` feature".to_string(),
        ));
    }

    let subscriber = Registry::default().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(false),
    );
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| Error::Telemetry(err.to_string()))?;
    Ok(guard)
}
