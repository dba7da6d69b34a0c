// src/error.rs
use thiserror::Error;

/// Ошибка конфигурации — единственная ошибка, которую видит вызывающий код.
///
/// Проверка выполняется до начала генерации; дальше все этапы считают
/// конфигурацию корректной.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("map dimensions must be between 1 and 4096, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("{name}: min {min} is greater than max {max}")]
    InvalidRange {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
