//! Framing for the collector's length-prefixed binary/JSON protocol.
//!
//! A frame is 5 magic bytes (`ZBXD` + protocol version 1), an 8-byte
//! little-endian payload length, and the raw JSON payload. Responses mirror
//! the framing.

use serde::{Deserialize, Serialize};

use crate::error::CollectorError;

use super::Metric;

pub(crate) const FRAME_MAGIC: [u8; 5] = *b"ZBXD\x01";
pub(crate) const FRAME_HEADER_LEN: usize = 13;
/// Sanity cap on response bodies; collector replies are a few hundred bytes.
pub(crate) const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Serialize)]
struct SenderRequest<'frame> {
    request: &'static str,
    data: Vec<MetricPayload<'frame>>,
}

#[derive(Debug, Serialize)]
struct MetricPayload<'frame> {
    host: &'frame str,
    key: &'frame str,
    value: &'frame str,
    clock: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SenderResponse {
    pub(crate) response: String,
    #[serde(default)]
    pub(crate) info: Option<String>,
}

/// Serializes a metric batch into one complete request frame. Metrics without
/// an explicit clock get `default_clock`.
pub(crate) fn encode_request(
    metrics: &[Metric],
    default_clock: i64,
) -> Result<Vec<u8>, CollectorError> {
    let data = metrics
        .iter()
        .map(|metric| MetricPayload {
            host: &metric.host,
            key: &metric.key,
            value: &metric.value,
            clock: metric.clock.unwrap_or(default_clock),
        })
        .collect();
    let payload = serde_json::to_vec(&SenderRequest {
        request: "sender data",
        data,
    })
    .map_err(|err| CollectorError::Serialize {
        context: "sender request",
        source: err,
    })?;

    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN.saturating_add(payload.len()));
    frame.extend_from_slice(&FRAME_MAGIC);
    frame.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Validates a response header and returns the body length it announces.
pub(crate) fn decode_response_header(
    header: &[u8; FRAME_HEADER_LEN],
) -> Result<usize, CollectorError> {
    if !header.starts_with(&FRAME_MAGIC) {
        return Err(CollectorError::BadResponseHeader);
    }
    let len_bytes: [u8; 8] = header
        .get(FRAME_MAGIC.len()..FRAME_HEADER_LEN)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(CollectorError::BadResponseHeader)?;
    let body_len = usize::try_from(u64::from_le_bytes(len_bytes)).map_err(|_| {
        CollectorError::ResponseTooLarge {
            max_bytes: MAX_RESPONSE_BYTES,
        }
    })?;
    if body_len > MAX_RESPONSE_BYTES {
        return Err(CollectorError::ResponseTooLarge {
            max_bytes: MAX_RESPONSE_BYTES,
        });
    }
    Ok(body_len)
}

pub(crate) fn parse_response_body(body: &[u8]) -> Result<SenderResponse, CollectorError> {
    serde_json::from_slice(body).map_err(|err| CollectorError::Deserialize {
        context: "sender response",
        source: err,
    })
}
