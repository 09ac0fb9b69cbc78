use super::{SECONDS_PER_MINUTE, WindowAggregator, WindowPlan, format_minute_tag, plan_windows};
use crate::parse::NginxLineParser;

// Minute-aligned base epoch used across tests (1_755_000_000 / 60 is exact).
const BASE_MINUTE: i64 = 1_755_000_000;

fn log_line(minute_start: i64, second: u32, status: u16, rtime: &str) -> String {
    format!(
        "203.0.113.7 - - [{}:{:02} +0000] \"GET /api HTTP/1.1\" {} 612 \"-\" \"Mozilla/5.0\" \"-\" example.com {} {} ",
        format_minute_tag(minute_start),
        second,
        status,
        rtime,
        rtime
    )
}

fn plan_for(starts: Vec<i64>) -> WindowPlan {
    let end_minute = starts.last().copied().unwrap_or(0);
    WindowPlan { end_minute, starts }
}

fn parser() -> Result<NginxLineParser, String> {
    NginxLineParser::new().map_err(|err| format!("parser construction failed: {}", err))
}

#[test]
fn first_run_plans_exactly_the_lookback_count() -> Result<(), String> {
    let now = BASE_MINUTE.saturating_add(37);
    let plan = plan_windows(now, 0, 5);

    if plan.starts.len() != 5 {
        return Err(format!("Expected 5 windows, got {}", plan.starts.len()));
    }
    let expected_end = BASE_MINUTE.saturating_sub(SECONDS_PER_MINUTE);
    if plan.end_minute != expected_end {
        return Err(format!("Unexpected end minute: {}", plan.end_minute));
    }
    if plan.starts.last() != Some(&expected_end) {
        return Err("Newest window must end the plan".to_owned());
    }

    Ok(())
}

#[test]
fn subsequent_runs_cover_every_minute_since_the_stored_end() -> Result<(), String> {
    let now = BASE_MINUTE.saturating_add(37);
    let end_minute = BASE_MINUTE.saturating_sub(SECONDS_PER_MINUTE);
    let stored = end_minute.saturating_sub(SECONDS_PER_MINUTE.saturating_mul(3));
    let plan = plan_windows(now, stored, 5);

    let expected: Vec<i64> = (1..=3)
        .map(|step: i64| stored.saturating_add(step.saturating_mul(SECONDS_PER_MINUTE)))
        .collect();
    if plan.starts != expected {
        return Err(format!("Unexpected starts: {:?}", plan.starts));
    }

    Ok(())
}

#[test]
fn no_elapsed_minute_means_an_empty_plan() -> Result<(), String> {
    let now = BASE_MINUTE.saturating_add(37);
    let end_minute = BASE_MINUTE.saturating_sub(SECONDS_PER_MINUTE);

    let plan = plan_windows(now, end_minute, 5);
    if !plan.is_empty() {
        return Err(format!("Expected empty plan, got {:?}", plan.starts));
    }
    // A stored end in the future (clock skew) must not underflow into windows.
    let plan = plan_windows(now, end_minute.saturating_add(SECONDS_PER_MINUTE), 5);
    if !plan.is_empty() {
        return Err(format!("Expected empty plan, got {:?}", plan.starts));
    }

    Ok(())
}

#[test]
fn request_counts_equal_the_number_of_matching_lines() -> Result<(), String> {
    let parser = parser()?;
    let first = BASE_MINUTE;
    let second_window = BASE_MINUTE.saturating_add(SECONDS_PER_MINUTE);
    let plan = plan_for(vec![first, second_window]);
    let mut aggregator = WindowAggregator::new(&plan, 0);

    let lines = [
        log_line(first, 5, 200, "0.010"),
        log_line(first, 5, 404, "0.020"),
        log_line(first, 59, 502, "1.500"),
        log_line(second_window, 0, 200, "0.005"),
        // Outside every planned window.
        log_line(BASE_MINUTE.saturating_sub(SECONDS_PER_MINUTE), 10, 200, "0.001"),
    ];
    let mut offset = 0u64;
    for line in &lines {
        offset = offset.saturating_add(line.len() as u64);
        aggregator.observe(line, offset, &parser);
    }

    let total: u64 = aggregator
        .windows()
        .iter()
        .flat_map(|window| window.buckets())
        .map(|bucket| bucket.requests)
        .sum();
    if total != 4 {
        return Err(format!("Expected 4 attributed requests, got {}", total));
    }
    if aggregator.attributed_lines() != 4 {
        return Err(format!(
            "Expected 4 attributed lines, got {}",
            aggregator.attributed_lines()
        ));
    }

    Ok(())
}

#[test]
fn client_and_server_errors_are_disjoint_per_line() -> Result<(), String> {
    let parser = parser()?;
    let plan = plan_for(vec![BASE_MINUTE]);
    let mut aggregator = WindowAggregator::new(&plan, 0);

    for (second, status) in [(1u32, 399u16), (2, 400), (3, 499), (4, 500), (5, 599), (6, 600)] {
        aggregator.observe(&log_line(BASE_MINUTE, second, status, "0.010"), 1, &parser);
    }

    let window = aggregator
        .windows()
        .first()
        .ok_or_else(|| "Missing window".to_owned())?;
    for (second, bucket) in window.buckets().iter().enumerate() {
        if bucket.client_errors > 0 && bucket.server_errors > 0 {
            return Err(format!("Second {} counted both 4xx and 5xx", second));
        }
        if bucket.client_errors.saturating_add(bucket.server_errors) > bucket.requests {
            return Err(format!("Second {} error counts exceed requests", second));
        }
    }
    let client_total: u64 = window.buckets().iter().map(|bucket| bucket.client_errors).sum();
    let server_total: u64 = window.buckets().iter().map(|bucket| bucket.server_errors).sum();
    if client_total != 2 || server_total != 2 {
        return Err(format!(
            "Expected 2 client and 2 server errors, got {} and {}",
            client_total, server_total
        ));
    }

    Ok(())
}

#[test]
fn aggregation_is_idempotent_over_the_same_lines() -> Result<(), String> {
    let parser = parser()?;
    let plan = plan_for(vec![BASE_MINUTE, BASE_MINUTE.saturating_add(SECONDS_PER_MINUTE)]);
    let lines = [
        log_line(BASE_MINUTE, 10, 200, "0.100"),
        log_line(BASE_MINUTE, 10, 503, "0.300"),
        log_line(BASE_MINUTE.saturating_add(SECONDS_PER_MINUTE), 42, 404, "0.050"),
    ];

    let mut runs = Vec::new();
    for _ in 0..2 {
        let mut aggregator = WindowAggregator::new(&plan, 0);
        let mut offset = 0u64;
        for line in &lines {
            offset = offset.saturating_add(line.len() as u64);
            aggregator.observe(line, offset, &parser);
        }
        runs.push(aggregator);
    }

    let (first_run, second_run) = match runs.as_slice() {
        [first_run, second_run] => (first_run, second_run),
        _ => return Err("Expected two runs".to_owned()),
    };
    if first_run.windows() != second_run.windows() {
        return Err("Buckets differ between identical runs".to_owned());
    }
    if first_run.consumed_offset() != second_run.consumed_offset() {
        return Err("Consumed offsets differ between identical runs".to_owned());
    }

    Ok(())
}

#[test]
fn consumed_offset_advances_only_for_attributed_lines() -> Result<(), String> {
    let parser = parser()?;
    let plan = plan_for(vec![BASE_MINUTE]);
    let mut aggregator = WindowAggregator::new(&plan, 0);

    aggregator.observe(&log_line(BASE_MINUTE, 3, 200, "0.010"), 100, &parser);
    if aggregator.consumed_offset() != 100 {
        return Err(format!("Expected offset 100, got {}", aggregator.consumed_offset()));
    }

    // A line for a minute outside the plan is ignored entirely.
    let outside = log_line(BASE_MINUTE.saturating_add(SECONDS_PER_MINUTE), 3, 200, "0.010");
    aggregator.observe(&outside, 200, &parser);
    if aggregator.consumed_offset() != 100 {
        return Err("Unmatched line must not advance the offset".to_owned());
    }

    // A garbled line inside a matched minute is skipped but still consumed.
    let garbled = format!("?? {} ??", format_minute_tag(BASE_MINUTE));
    aggregator.observe(&garbled, 300, &parser);
    if aggregator.consumed_offset() != 300 {
        return Err("Garbled line inside the minute must advance the offset".to_owned());
    }
    if aggregator.parse_failures() != 1 {
        return Err(format!(
            "Expected 1 parse failure, got {}",
            aggregator.parse_failures()
        ));
    }
    if aggregator.attributed_lines() != 1 {
        return Err(format!(
            "Expected 1 attributed line, got {}",
            aggregator.attributed_lines()
        ));
    }

    Ok(())
}

#[test]
fn drain_emits_every_second_of_every_window() -> Result<(), String> {
    let parser = parser()?;
    let plan = plan_for(vec![BASE_MINUTE]);
    let mut aggregator = WindowAggregator::new(&plan, 0);
    aggregator.observe(&log_line(BASE_MINUTE, 7, 500, "0.250"), 1, &parser);

    let metrics = aggregator.into_metrics("web-1", "yana.nginx");
    if metrics.len() != 240 {
        return Err(format!("Expected 240 metrics, got {}", metrics.len()));
    }

    let clock = BASE_MINUTE.saturating_add(7);
    let find = |key: &str, clock: i64| {
        metrics
            .iter()
            .find(|metric| metric.key == key && metric.clock == Some(clock))
    };
    let qps = find("yana.nginx[qps]", clock).ok_or_else(|| "Missing qps metric".to_owned())?;
    if qps.value != "1" || qps.host != "web-1" {
        return Err(format!("Unexpected qps metric: {:?}", qps));
    }
    let code_5xx = find("yana.nginx[code_5xx]", clock)
        .ok_or_else(|| "Missing code_5xx metric".to_owned())?;
    if code_5xx.value != "1" {
        return Err(format!("Unexpected code_5xx value: {}", code_5xx.value));
    }
    let request_time = find("yana.nginx[request_time]", clock)
        .ok_or_else(|| "Missing request_time metric".to_owned())?;
    if request_time.value != "0.250" {
        return Err(format!("Unexpected request_time value: {}", request_time.value));
    }
    let idle = find("yana.nginx[qps]", BASE_MINUTE.saturating_add(8))
        .ok_or_else(|| "Missing idle-second metric".to_owned())?;
    if idle.value != "0" {
        return Err(format!("Idle second should be zero, got {}", idle.value));
    }

    Ok(())
}
