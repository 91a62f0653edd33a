use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log level enum for type-safe logging
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Directive used when `RUST_LOG` is not set
    fn directive(&self) -> String {
        format!("pokedex={},pokedex_lib={}", self.as_str(), self.as_str())
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Calling this more than once is
/// harmless; later calls leave the first subscriber in place.
pub fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

// Macro for easy logging
#[macro_export]
macro_rules! app_log {
	($level:expr, $($arg:tt)*) => {
		{
			use $crate::logger::LogLevel;
			let message = format!($($arg)*);
			match $level {
				LogLevel::Error => tracing::error!(target: "pokedex", "{}", message),
				LogLevel::Warn => tracing::warn!(target: "pokedex", "{}", message),
				LogLevel::Info => tracing::info!(target: "pokedex", "{}", message),
				LogLevel::Debug => tracing::debug!(target: "pokedex", "{}", message),
			}
		}
	};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_round_trip_names() {
        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error] {
            assert_eq!(LogLevel::from_str(level.as_str()), Some(level));
        }
    }

    #[test]
    fn test_level_parsing_is_lenient() {
        assert_eq!(LogLevel::from_str(" WARNING "), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("verbose"), None);
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Error);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_macro_accepts_format_args() {
        init_logging(LogLevel::Debug);
        app_log!(LogLevel::Info, "fetched {} pokémon", 5);
    }
}
