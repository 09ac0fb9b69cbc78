use thiserror::Error;

use super::{CollectorError, ConfigError, CursorError, TailError, ValidationError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("CLI error: {source}")]
    Clap {
        #[from]
        source: clap::Error,
    },
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("TOML error: {source}")]
    Toml {
        #[from]
        source: toml::de::Error,
    },
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Cursor error: {0}")]
    Cursor(#[from] CursorError),
    #[error("Tail error: {0}")]
    Tail(#[from] TailError),
    #[error("Collector error: {0}")]
    Collector(#[from] CollectorError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation<E>(error: E) -> Self
    where
        E: Into<ValidationError>,
    {
        error.into().into()
    }

    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }

    pub fn cursor<E>(error: E) -> Self
    where
        E: Into<CursorError>,
    {
        error.into().into()
    }

    pub fn tail<E>(error: E) -> Self
    where
        E: Into<TailError>,
    {
        error.into().into()
    }

    pub fn collector<E>(error: E) -> Self
    where
        E: Into<CollectorError>,
    {
        error.into().into()
    }
}
