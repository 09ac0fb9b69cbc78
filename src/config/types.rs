use std::time::Duration;

use serde::Deserialize;

use crate::args::parse_duration_arg;
use crate::error::{AppError, AppResult, ConfigError};

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub collector_host: Option<String>,
    pub collector_port: Option<u16>,
    pub hostname: Option<String>,
    #[serde(alias = "log_file")]
    pub log_files: Option<Vec<String>>,
    pub seek_path: Option<String>,
    pub lookback_minutes: Option<u32>,
    pub key_prefix: Option<String>,
    pub net_timeout: Option<DurationValue>,
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self, field: &'static str) -> AppResult<Duration> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(AppError::config(ConfigError::FieldMustBePositive { field }))
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration_arg(text),
        }
    }
}
