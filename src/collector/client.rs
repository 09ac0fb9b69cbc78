use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::CollectorError;

use super::Metric;
use super::protocol::{
    FRAME_HEADER_LEN, decode_response_header, encode_request, parse_response_body,
};

/// Outcome of one successful collector exchange.
#[derive(Debug, Clone)]
pub struct SendReport {
    pub metrics_sent: usize,
    /// Collector-side processing summary, when present in the response.
    pub info: Option<String>,
}

/// One-shot sender for metric batches. Opens a fresh connection per batch;
/// every phase of the exchange runs under the configured timeout.
#[derive(Debug, Clone)]
pub struct CollectorClient {
    host: String,
    port: u16,
    net_timeout: Duration,
}

impl CollectorClient {
    pub fn new(host: impl Into<String>, port: u16, net_timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            net_timeout,
        }
    }

    /// Sends one batch and waits for the collector's verdict.
    ///
    /// # Errors
    ///
    /// Returns an error on connect failure, timeout, short or malformed
    /// response, or a non-success verdict. The batch is not retried.
    pub async fn send(&self, metrics: &[Metric]) -> Result<SendReport, CollectorError> {
        let frame = encode_request(metrics, chrono::Utc::now().timestamp())?;
        let addr = format!("{}:{}", self.host, self.port);

        let mut stream = self
            .bounded("connect", TcpStream::connect(&addr))
            .await?
            .map_err(|err| CollectorError::Connect {
                addr: addr.clone(),
                source: err,
            })?;

        self.bounded("send request", stream.write_all(&frame))
            .await?
            .map_err(|err| CollectorError::Io {
                context: "send request",
                source: err,
            })?;

        let mut header = [0u8; FRAME_HEADER_LEN];
        self.bounded("read response header", stream.read_exact(&mut header))
            .await?
            .map_err(|err| {
                if err.kind() == std::io::ErrorKind::UnexpectedEof {
                    CollectorError::BadResponseHeader
                } else {
                    CollectorError::Io {
                        context: "read response header",
                        source: err,
                    }
                }
            })?;
        let body_len = decode_response_header(&header)?;

        let mut body = vec![0u8; body_len];
        self.bounded("read response body", stream.read_exact(&mut body))
            .await?
            .map_err(|err| CollectorError::Io {
                context: "read response body",
                source: err,
            })?;

        let response = parse_response_body(&body)?;
        if response.response != "success" {
            return Err(CollectorError::Rejected {
                info: response.info.unwrap_or(response.response),
            });
        }

        Ok(SendReport {
            metrics_sent: metrics.len(),
            info: response.info,
        })
    }

    async fn bounded<F>(&self, context: &'static str, future: F) -> Result<F::Output, CollectorError>
    where
        F: std::future::Future,
    {
        tokio::time::timeout(self.net_timeout, future)
            .await
            .map_err(|_elapsed| CollectorError::Timeout {
                context,
                timeout_ms: u64::try_from(self.net_timeout.as_millis()).unwrap_or(u64::MAX),
            })
    }
}
