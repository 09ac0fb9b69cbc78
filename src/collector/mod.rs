//! Collector wire protocol and client.
mod client;
pub(crate) mod protocol;

pub use client::{CollectorClient, SendReport};

/// One timestamped value destined for the collector. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub host: String,
    pub key: String,
    pub value: String,
    /// Epoch seconds; a missing clock is filled with wall-clock time at
    /// serialization.
    pub clock: Option<i64>,
}

impl Metric {
    #[must_use]
    pub fn new(host: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            key: key.into(),
            value: value.into(),
            clock: None,
        }
    }

    #[must_use]
    pub fn with_clock(
        host: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
        clock: i64,
    ) -> Self {
        Self {
            host: host.into(),
            key: key.into(),
            value: value.into(),
            clock: Some(clock),
        }
    }
}
