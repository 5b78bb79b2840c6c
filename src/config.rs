use crate::storage::resolve_data_path;
use crate::timers::{CLOCK_PERIOD, SCAN_PERIOD};
use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub data_path: PathBuf,
    pub clock_period: Duration,
    pub scan_period: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, std::io::Error> {
        Ok(Self {
            port: parse_var("PORT").unwrap_or(8080),
            data_path: resolve_data_path()?,
            clock_period: parse_var("APP_CLOCK_INTERVAL_MS")
                .filter(|millis| *millis > 0)
                .map(Duration::from_millis)
                .unwrap_or(CLOCK_PERIOD),
            scan_period: parse_var("APP_SCAN_INTERVAL_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(SCAN_PERIOD),
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.trim().parse().ok())
}
