use clap::Parser;
use std::time::Duration;

use super::defaults::default_seek_path;
use super::parsers::parse_duration_arg;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Incremental nginx access-log scanner that aggregates per-second request stats into one-minute windows and pushes them to a Zabbix collector."
)]
pub struct AgentArgs {
    /// Path to a TOML/JSON config file
    #[arg(long = "config", short = 'c')]
    pub config: Option<String>,

    /// Collector (Zabbix server/proxy) host
    #[arg(long = "collector-host", default_value = "127.0.0.1")]
    pub collector_host: String,

    /// Collector trapper port
    #[arg(long = "collector-port", default_value_t = 10051)]
    pub collector_port: u16,

    /// Monitored host name as registered on the collector
    #[arg(long = "hostname", short = 's')]
    pub hostname: Option<String>,

    /// Access log file to scan (repeatable)
    #[arg(long = "log-file", short = 'f')]
    pub log_files: Vec<String>,

    /// Directory holding per-log cursor files
    #[arg(long = "seek-path", default_value_t = default_seek_path())]
    pub seek_path: String,

    /// Minutes to scan on the first run, before any cursor exists
    #[arg(long = "lookback-minutes", default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub lookback_minutes: u32,

    /// Item key prefix, producing keys like '<prefix>[qps]'
    #[arg(long = "key-prefix", default_value = "yana.nginx")]
    pub key_prefix: String,

    /// Connect/read timeout for the collector exchange (supports ms/s/m/h)
    #[arg(long = "net-timeout", default_value = "10s", value_parser = parse_duration_arg)]
    pub net_timeout: Duration,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
