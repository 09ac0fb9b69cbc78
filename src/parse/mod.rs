//! Log-line parsing capability.
//!
//! Window attribution only needs three fields out of a matched line: the
//! second within the minute, the status code, and the upstream response time.
//! The extraction itself is pluggable behind [`LineParser`]; the default
//! implementation handles the nginx combined format extended with
//! `$request_time $upstream_response_time` fields.

use regex::Regex;

use crate::error::ValidationError;

/// Fields extracted from one attributed access-log line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedRequest {
    /// Second of the minute the request was logged in (0..=59).
    pub second: u32,
    pub status: u16,
    /// Upstream response time in seconds.
    pub response_time: f64,
}

pub trait LineParser {
    /// Extracts the per-request fields from a raw log line, or `None` when
    /// the line does not follow the expected grammar.
    fn parse(&self, line: &str) -> Option<ParsedRequest>;
}

/// Parser for nginx access-log lines of the shape:
///
/// ```text
/// <addr> - <user> [dd/Mon/yyyy:HH:MM:SS +TZ] "<request>" <status> <bytes>
/// "<referrer>" "<agent>" "<xff>" <host> <request_time> <upstream_time>
/// ```
#[derive(Debug)]
pub struct NginxLineParser {
    pattern: Regex,
}

const NGINX_LINE_PATTERN: &str = r#"^[\d.]+\s-\s.*\s\[\S+:\d+:\d+:(?P<second>\d+)\s[+-]\d+\]\s"\S+\s\S+\s\S+"\s(?P<status>\d+)\s\S+\s"\S+"\s".*?"\s".*?"\s\S+\s(?P<rtime>[\d.]+)\s[\d.]+\s*"#;

impl NginxLineParser {
    /// # Errors
    ///
    /// Returns an error when the line pattern fails to compile.
    pub fn new() -> Result<Self, ValidationError> {
        let pattern = Regex::new(NGINX_LINE_PATTERN)
            .map_err(|err| ValidationError::InvalidPattern { source: err })?;
        Ok(Self { pattern })
    }
}

impl LineParser for NginxLineParser {
    fn parse(&self, line: &str) -> Option<ParsedRequest> {
        let captures = self.pattern.captures(line)?;
        let second = captures.name("second")?.as_str().parse::<u32>().ok()?;
        if second > 59 {
            return None;
        }
        let status = captures.name("status")?.as_str().parse::<u16>().ok()?;
        let response_time = captures.name("rtime")?.as_str().parse::<f64>().ok()?;
        if !response_time.is_finite() || response_time < 0.0 {
            return None;
        }
        Some(ParsedRequest {
            second,
            status,
            response_time,
        })
    }
}
