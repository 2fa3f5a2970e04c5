//! Tracing subscriber setup. All log output goes to stderr.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "ALGOLAB_LOG";

/// Install the global subscriber. `ALGOLAB_LOG` overrides `log_level`;
/// `log_format` is `text` or `json`.
pub fn init_tracing(log_level: &str, log_format: &str) -> Result<(), String> {
    let filter = std::env::var(LOG_ENV).unwrap_or_else(|_| log_level.to_string());
    let env_filter =
        EnvFilter::try_new(filter).map_err(|err| format!("invalid log filter: {err}"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    // A subscriber installed earlier in the process stays in place.
    let _ = match log_format.trim().to_lowercase().as_str() {
        "json" => builder.json().try_init(),
        "text" => builder.try_init(),
        other => return Err(format!("unknown log format: {other}")),
    };
    Ok(())
}
