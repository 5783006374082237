use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::args::duration_from_str;
use crate::error::ValidationError;

/// Every field is optional; only values absent from the command line apply.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub model: Option<String>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub poll_timeout: Option<DurationValue>,
    pub verbose: Option<bool>,
    pub no_color: Option<bool>,
    pub bench: Option<BenchConfig>,
    pub suite: Option<SuiteConfig>,
    pub probe: Option<ProbeConfig>,
    pub live: Option<LiveConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BenchConfig {
    pub requests: Option<usize>,
    pub pause_every: Option<usize>,
    pub pause: Option<DurationValue>,
    pub clients: Option<usize>,
    pub per_client: Option<usize>,
    pub streams: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuiteConfig {
    pub concurrent: Option<usize>,
    pub rate_requests: Option<usize>,
    pub rate_delay: Option<DurationValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProbeConfig {
    pub burst: Option<usize>,
    pub reset_pause: Option<DurationValue>,
    pub streams: Option<usize>,
    pub no_integrity: Option<bool>,
}

/// Shared by `dashboard` and `monitor`; the monitor-only keys are ignored by the dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct LiveConfig {
    pub interval: Option<DurationValue>,
    pub plain: Option<bool>,
    pub history_max: Option<usize>,
    pub window: Option<usize>,
    pub log_dir: Option<PathBuf>,
}

/// Seconds as a number, or text with a `ms/s/m/h` suffix.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => duration_from_str(text),
        }
    }
}
