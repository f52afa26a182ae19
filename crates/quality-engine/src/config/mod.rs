use std::env;
use std::fmt;

const DEFAULT_SCALE_TOLERANCE: f64 = 1e-6;

/// Distinguishes runtime behavior for different stages of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let scale_tolerance = match env::var("APP_SCALE_TOLERANCE") {
            Ok(raw) => parse_tolerance(&raw)?,
            Err(_) => DEFAULT_SCALE_TOLERANCE,
        };

        let default_locale = env::var("APP_DEFAULT_LOCALE")
            .map(|value| value.trim().to_string())
            .unwrap_or_else(|_| "en".to_string());
        if default_locale.is_empty() {
            return Err(ConfigError::EmptyLocale);
        }

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            engine: EngineConfig {
                scale_tolerance,
                default_locale,
            },
        })
    }
}

fn parse_tolerance(raw: &str) -> Result<f64, ConfigError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|source| ConfigError::InvalidTolerance {
            value: raw.to_string(),
            source: Some(source),
        })?;

    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidTolerance {
            value: raw.to_string(),
            source: None,
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Knobs consumed by the template validator and the CLI renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Allowed distance between a threshold and the nearest step of a numeric scale.
    pub scale_tolerance: f64,
    pub default_locale: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scale_tolerance: DEFAULT_SCALE_TOLERANCE,
            default_locale: "en".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidTolerance {
        value: String,
        source: Option<std::num::ParseFloatError>,
    },
    EmptyLocale,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTolerance { value, .. } => write!(
                f,
                "APP_SCALE_TOLERANCE must be a positive number (found '{}')",
                value
            ),
            ConfigError::EmptyLocale => write!(f, "APP_DEFAULT_LOCALE must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidTolerance {
                source: Some(source),
                ..
            } => Some(source),
            ConfigError::InvalidTolerance { source: None, .. } | ConfigError::EmptyLocale => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_SCALE_TOLERANCE");
        env::remove_var("APP_DEFAULT_LOCALE");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn reads_production_environment_and_tolerance() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "prod");
        env::set_var("APP_SCALE_TOLERANCE", "0.001");
        env::set_var("APP_DEFAULT_LOCALE", "pt-BR");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.engine.scale_tolerance, 0.001);
        assert_eq!(config.engine.default_locale, "pt-BR");
        reset_env();
    }

    #[test]
    fn rejects_non_positive_tolerance() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_SCALE_TOLERANCE", "-1");
        match AppConfig::load() {
            Err(ConfigError::InvalidTolerance { value, source: None }) => assert_eq!(value, "-1"),
            other => panic!("expected invalid tolerance, got {other:?}"),
        }
        env::set_var("APP_SCALE_TOLERANCE", "tight");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidTolerance {
                source: Some(_),
                ..
            })
        ));
        reset_env();
    }
}
