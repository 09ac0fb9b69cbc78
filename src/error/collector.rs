use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Connection error to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Timed out during {context} after {timeout_ms} ms.")]
    Timeout {
        context: &'static str,
        timeout_ms: u64,
    },
    #[error("I/O error during {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Collector response header was malformed.")]
    BadResponseHeader,
    #[error("Collector response body exceeded max size ({max_bytes} bytes).")]
    ResponseTooLarge { max_bytes: usize },
    #[error("Serialization error during {context}: {source}")]
    Serialize {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Deserialization error during {context}: {source}")]
    Deserialize {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Collector rejected the batch: {info}")]
    Rejected { info: String },
}
