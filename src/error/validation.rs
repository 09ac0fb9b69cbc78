use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing monitored hostname (set --hostname or provide in config).")]
    MissingHostname,
    #[error("No log files to scan (set --log-file or provide in config).")]
    MissingLogFiles,
    #[error("Invalid line-parser pattern: {source}")]
    InvalidPattern {
        #[source]
        source: regex::Error,
    },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
}
