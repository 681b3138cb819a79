use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(f, "invalid log filter '{value}': unable to build EnvFilter")
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Crate target whose events (records created, updated, rejected) get their own level.
const RECORD_TARGET: &str = "society";

/// Filter directives for the configured levels.
///
/// A bare level such as `info` gains a `society=<level>` directive so record events can be
/// turned up or down without touching the HTTP stack. Values that already carry directives are
/// used verbatim.
pub fn filter_directives(config: &TelemetryConfig) -> String {
    let base = config.log_level.trim();
    if base.contains('=') || base.contains(',') {
        return base.to_string();
    }

    let records = config.record_log_level.as_deref().unwrap_or(base);
    format!("{base},{RECORD_TARGET}={records}")
}

/// Install the global fmt subscriber. `RUST_LOG` wins over the configured levels.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let directives = filter_directives(config);
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&directives).map_err(|source| TelemetryError::EnvFilter {
            value: directives.clone(),
            source,
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)?;

    tracing::debug!(%directives, "record service telemetry ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(log_level: &str, record_log_level: Option<&str>) -> TelemetryConfig {
        TelemetryConfig {
            log_level: log_level.to_string(),
            record_log_level: record_log_level.map(str::to_string),
        }
    }

    #[test]
    fn record_events_follow_the_base_level_by_default() {
        assert_eq!(filter_directives(&config("info", None)), "info,society=info");
    }

    #[test]
    fn record_events_can_be_raised_on_their_own() {
        assert_eq!(
            filter_directives(&config(" warn ", Some("debug"))),
            "warn,society=debug"
        );
    }

    #[test]
    fn explicit_directives_pass_through() {
        assert_eq!(
            filter_directives(&config("info,axum=debug", Some("trace"))),
            "info,axum=debug"
        );
    }
}
