//! Per-run orchestration: cursor → window plan → scan → persist → send.

use std::path::Path;

use chrono::Local;

use crate::args::AgentArgs;
use crate::collector::CollectorClient;
use crate::cursor::CursorStore;
use crate::error::{AppError, AppResult, ValidationError};
use crate::parse::{LineParser, NginxLineParser};
use crate::tail;
use crate::window::{WindowAggregator, plan_windows};

/// Runs one scan-and-send cycle over every configured log file.
///
/// Degraded conditions inside a single log's pipeline (scan failure, cursor
/// write failure, collector rejection) are logged and never abort the other
/// logs or the process.
///
/// # Errors
///
/// Returns an error only for unusable configuration: a missing hostname, no
/// log files, or a line-parser pattern that does not compile.
pub async fn run_agent(args: &AgentArgs) -> AppResult<()> {
    let hostname = match args.hostname.as_deref() {
        Some(hostname) => hostname,
        None => {
            tracing::error!("Missing hostname (set --hostname or provide in config).");
            return Err(AppError::validation(ValidationError::MissingHostname));
        }
    };
    if args.log_files.is_empty() {
        tracing::error!("No log files to scan (set --log-file or provide in config).");
        return Err(AppError::validation(ValidationError::MissingLogFiles));
    }

    let parser = NginxLineParser::new().map_err(AppError::validation)?;
    let store = CursorStore::new(&args.seek_path);
    let client = CollectorClient::new(
        args.collector_host.clone(),
        args.collector_port,
        args.net_timeout,
    );

    for log_file in &args.log_files {
        run_one_log(log_file, hostname, args, &store, &client, &parser).await;
    }

    Ok(())
}

async fn run_one_log(
    log_file: &str,
    hostname: &str,
    args: &AgentArgs,
    store: &CursorStore,
    client: &CollectorClient,
    parser: &dyn LineParser,
) {
    let log_path = Path::new(log_file);
    let Some(log_name) = log_path.file_name().and_then(|name| name.to_str()) else {
        tracing::error!(log = log_file, "Log path has no usable file name, skipping");
        return;
    };

    let stored = store.read(log_name);
    let plan = plan_windows(
        Local::now().timestamp(),
        stored.window_end,
        args.lookback_minutes,
    );
    if plan.is_empty() {
        tracing::debug!(log = log_file, "No fully elapsed minute since the last run");
        return;
    }

    let mut aggregator = WindowAggregator::new(&plan, stored.offset);
    let outcome =
        match tail::scan_log(log_path, stored, plan.end_minute, &mut aggregator, parser).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(log = log_file, error = %err, "Scan failed, skipping this log");
                return;
            }
        };
    tracing::info!(
        log = log_file,
        windows = plan.starts.len(),
        lines = outcome.lines_seen,
        attributed = aggregator.attributed_lines(),
        parse_failures = aggregator.parse_failures(),
        rotated = outcome.rotated,
        "Scan complete"
    );

    if let Err(err) = store.write(log_name, &outcome.cursor) {
        // The next run re-reads the old cursor and may resend the overlap.
        tracing::error!(log = log_file, error = %err, "Failed to persist cursor, next run will re-scan");
    }

    let metrics = aggregator.into_metrics(hostname, &args.key_prefix);
    match client.send(&metrics).await {
        Ok(report) => {
            tracing::info!(
                log = log_file,
                metrics = report.metrics_sent,
                info = report.info.as_deref().unwrap_or("-"),
                "Metrics accepted by collector"
            );
        }
        Err(err) => {
            tracing::error!(log = log_file, error = %err, "Collector exchange failed, dropping this batch");
        }
    }
}
