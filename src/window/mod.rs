//! Time-bucketed aggregation of access-log lines.
//!
//! Each run covers a contiguous range of one-minute windows; every window
//! owns 60 per-second buckets. A line is attributed to the first window whose
//! minute-tag (local time, `%d/%b/%Y:%H:%M`) appears verbatim in the line,
//! then the [`LineParser`] extracts the per-request fields.

use chrono::{Local, TimeZone};

use crate::collector::Metric;
use crate::parse::LineParser;

#[cfg(test)]
mod tests;

pub const SECONDS_PER_MINUTE: i64 = 60;

/// Per-second request counters. Created zeroed, only ever incremented.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SecondBucket {
    pub requests: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    pub response_time_sum: f64,
}

/// One minute-aligned window of 60 [`SecondBucket`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct MinuteWindow {
    start: i64,
    tag: String,
    buckets: Vec<SecondBucket>,
}

impl MinuteWindow {
    fn new(start: i64) -> Self {
        Self {
            start,
            tag: format_minute_tag(start),
            buckets: vec![SecondBucket::default(); SECONDS_PER_MINUTE as usize],
        }
    }

    #[must_use]
    pub const fn start(&self) -> i64 {
        self.start
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn buckets(&self) -> &[SecondBucket] {
        &self.buckets
    }
}

/// Formats a minute-aligned epoch second the way it appears inside the
/// bracketed timestamp of an access-log line, truncated to the minute.
#[must_use]
pub fn format_minute_tag(minute_start: i64) -> String {
    Local
        .timestamp_opt(minute_start, 0)
        .single()
        .map(|stamp| stamp.format("%d/%b/%Y:%H:%M").to_string())
        .unwrap_or_default()
}

/// The set of minute windows one run is responsible for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowPlan {
    /// Minute boundary this run aggregates up to (start of the newest window).
    pub end_minute: i64,
    /// Window starts, oldest to newest, each a multiple of 60.
    pub starts: Vec<i64>,
}

impl WindowPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}

/// Plans the windows for a run started at `now_epoch`.
///
/// The newest window is the last fully elapsed minute. On the first run
/// (no stored window end) exactly `lookback_minutes` windows are planned;
/// afterwards, every minute boundary since the stored window end gets one
/// window, so consecutive runs neither gap nor overlap. When no new minute
/// has elapsed the plan is empty.
#[must_use]
pub fn plan_windows(now_epoch: i64, stored_window_end: i64, lookback_minutes: u32) -> WindowPlan {
    let end_minute = now_epoch
        .saturating_sub(SECONDS_PER_MINUTE)
        .div_euclid(SECONDS_PER_MINUTE)
        .saturating_mul(SECONDS_PER_MINUTE);

    let minutes = if stored_window_end == 0 {
        i64::from(lookback_minutes)
    } else {
        end_minute
            .saturating_sub(stored_window_end)
            .div_euclid(SECONDS_PER_MINUTE)
    };

    let mut starts = Vec::new();
    let mut back = minutes;
    while back > 0 {
        starts.push(end_minute.saturating_sub(back.saturating_sub(1).saturating_mul(SECONDS_PER_MINUTE)));
        back = back.saturating_sub(1);
    }

    WindowPlan { end_minute, starts }
}

/// Attributes raw log lines to minute windows and accumulates per-second
/// counters. Aggregation is a pure function of (lines, plan): feeding the
/// same lines to a fresh aggregator built from the same plan yields
/// identical buckets.
#[derive(Debug)]
pub struct WindowAggregator {
    windows: Vec<MinuteWindow>,
    consumed_offset: u64,
    attributed_lines: u64,
    parse_failures: u64,
}

impl WindowAggregator {
    #[must_use]
    pub fn new(plan: &WindowPlan, start_offset: u64) -> Self {
        Self {
            windows: plan.starts.iter().map(|start| MinuteWindow::new(*start)).collect(),
            consumed_offset: start_offset,
            attributed_lines: 0,
            parse_failures: 0,
        }
    }

    /// Offset just past the last line attributed to a window. Lines matching
    /// no window do not advance it.
    #[must_use]
    pub const fn consumed_offset(&self) -> u64 {
        self.consumed_offset
    }

    #[must_use]
    pub const fn attributed_lines(&self) -> u64 {
        self.attributed_lines
    }

    #[must_use]
    pub const fn parse_failures(&self) -> u64 {
        self.parse_failures
    }

    #[must_use]
    pub fn windows(&self) -> &[MinuteWindow] {
        &self.windows
    }

    /// Feeds one raw line ending at byte `end_offset` of its file.
    pub fn observe(&mut self, line: &str, end_offset: u64, parser: &dyn LineParser) {
        for window in &mut self.windows {
            if !line.contains(window.tag.as_str()) {
                continue;
            }
            self.consumed_offset = end_offset;
            match parser.parse(line) {
                Some(request) => {
                    self.attributed_lines = self.attributed_lines.saturating_add(1);
                    if let Some(bucket) = window.buckets.get_mut(request.second as usize) {
                        bucket.requests = bucket.requests.saturating_add(1);
                        if (400..500).contains(&request.status) {
                            bucket.client_errors = bucket.client_errors.saturating_add(1);
                        }
                        if (500..600).contains(&request.status) {
                            bucket.server_errors = bucket.server_errors.saturating_add(1);
                        }
                        bucket.response_time_sum += request.response_time;
                    }
                }
                None => {
                    self.parse_failures = self.parse_failures.saturating_add(1);
                    tracing::debug!(tag = %window.tag, "Skipping unparseable line inside matched minute");
                }
            }
            return;
        }
    }

    /// Drains every window into collector metrics: one value per bucket field
    /// per second, with `clock` pointing at the exact second.
    #[must_use]
    pub fn into_metrics(self, host: &str, key_prefix: &str) -> Vec<Metric> {
        let mut metrics = Vec::new();
        for window in self.windows {
            for (second, bucket) in window.buckets.iter().enumerate() {
                let clock = window.start.saturating_add(second as i64);
                metrics.push(Metric::with_clock(
                    host,
                    format!("{}[qps]", key_prefix),
                    bucket.requests.to_string(),
                    clock,
                ));
                metrics.push(Metric::with_clock(
                    host,
                    format!("{}[code_4xx]", key_prefix),
                    bucket.client_errors.to_string(),
                    clock,
                ));
                metrics.push(Metric::with_clock(
                    host,
                    format!("{}[code_5xx]", key_prefix),
                    bucket.server_errors.to_string(),
                    clock,
                ));
                metrics.push(Metric::with_clock(
                    host,
                    format!("{}[request_time]", key_prefix),
                    format!("{:.3}", bucket.response_time_sum),
                    clock,
                ));
            }
        }
        metrics
    }
}
