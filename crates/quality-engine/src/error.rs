use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::templates::import::CatalogueImportError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Catalogue(CatalogueImportError),
    /// The template was read successfully but failed validation.
    InvalidTemplate(Vec<String>),
    UnknownPreset { kind: String, key: String },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Json(err) => write!(f, "template JSON error: {}", err),
            AppError::Catalogue(err) => write!(f, "catalogue import error: {}", err),
            AppError::InvalidTemplate(errors) => write!(
                f,
                "template is invalid ({} problem{})",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ),
            AppError::UnknownPreset { kind, key } => {
                write!(f, "no {} preset named '{}'", kind, key)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Catalogue(err) => Some(err),
            AppError::InvalidTemplate(_) | AppError::UnknownPreset { .. } => None,
        }
    }
}

impl AppError {
    /// Process exit status for the CLI: 1 for rejected input, 2 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::InvalidTemplate(_)
            | AppError::Json(_)
            | AppError::Catalogue(_)
            | AppError::UnknownPreset { .. } => 1,
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => 2,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<CatalogueImportError> for AppError {
    fn from(value: CatalogueImportError) -> Self {
        Self::Catalogue(value)
    }
}
