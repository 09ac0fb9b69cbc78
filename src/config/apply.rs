use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::AgentArgs;
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments.
///
/// CLI options given explicitly on the command line win over the config file.
///
/// # Errors
///
/// Returns an error when config values are invalid.
pub fn apply_config(
    args: &mut AgentArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "collector_host")
        && let Some(host) = config.collector_host.clone()
    {
        args.collector_host = host;
    }

    if !is_cli(matches, "collector_port")
        && let Some(port) = config.collector_port
    {
        args.collector_port = port;
    }

    if !is_cli(matches, "hostname")
        && let Some(hostname) = config.hostname.clone()
    {
        args.hostname = Some(hostname);
    }

    if !is_cli(matches, "log_files")
        && let Some(log_files) = config.log_files.clone()
    {
        args.log_files = log_files;
    }

    if !is_cli(matches, "seek_path")
        && let Some(seek_path) = config.seek_path.clone()
    {
        args.seek_path = seek_path;
    }

    if !is_cli(matches, "lookback_minutes")
        && let Some(lookback) = config.lookback_minutes
    {
        if lookback == 0 {
            return Err(AppError::config(ConfigError::FieldMustBePositive {
                field: "lookback_minutes",
            }));
        }
        args.lookback_minutes = lookback;
    }

    if !is_cli(matches, "key_prefix")
        && let Some(prefix) = config.key_prefix.clone()
    {
        args.key_prefix = prefix;
    }

    if !is_cli(matches, "net_timeout")
        && let Some(timeout) = config.net_timeout.as_ref()
    {
        args.net_timeout = timeout.to_duration("net_timeout")?;
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}
