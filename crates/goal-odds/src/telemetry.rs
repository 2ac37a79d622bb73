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
                write!(f, "log filter '{}' could not be parsed", value)
            }
            TelemetryError::Subscriber(err) => write!(f, "subscriber already installed: {err}"),
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

/// Filter directive used when `RUST_LOG` is absent.
///
/// Debug mode widens the crate's own output without touching the HTTP stack.
pub fn default_directive(config: &TelemetryConfig) -> String {
    if config.debug {
        format!("{},goal_odds=debug,goal_odds_cli=debug", config.log_level)
    } else {
        config.log_level.clone()
    }
}

/// Install the process-wide fmt subscriber. Logs go to stderr so rendered
/// predictions on stdout stay clean.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directive = default_directive(config);
            EnvFilter::try_new(&directive).map_err(|source| TelemetryError::EnvFilter {
                value: directive.clone(),
                source,
            })?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_mode_adds_crate_directives() {
        let config = TelemetryConfig {
            log_level: "warn".to_string(),
            debug: true,
        };
        assert_eq!(
            default_directive(&config),
            "warn,goal_odds=debug,goal_odds_cli=debug"
        );
    }

    #[test]
    fn plain_level_passes_through() {
        let config = TelemetryConfig {
            log_level: "info".to_string(),
            debug: false,
        };
        assert_eq!(default_directive(&config), "info");
    }
}
