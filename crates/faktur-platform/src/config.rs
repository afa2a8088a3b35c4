use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use faktur_core::Currency;
use faktur_recurring::Advancement;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub poll_interval: Duration,
    pub advancement: Advancement,
    pub default_currency: Currency,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            advancement: Advancement::default(),
            default_currency: Currency::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unset or blank keys fall back to
    /// their defaults; present but unparseable values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let data_dir = get("FAKTUR_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let poll_interval = match get("FAKTUR_POLL_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .with_context(|| format!("FAKTUR_POLL_INTERVAL_SECS is not a number: {raw}"))?;
                anyhow::ensure!(secs > 0, "FAKTUR_POLL_INTERVAL_SECS must be greater than zero");
                Duration::from_secs(secs)
            }
            None => defaults.poll_interval,
        };

        let advancement = match get("FAKTUR_ADVANCEMENT") {
            Some(raw) => parse_advancement(&raw)?,
            None => defaults.advancement,
        };

        let default_currency = match get("FAKTUR_DEFAULT_CURRENCY") {
            Some(raw) => Currency::from_code(&raw)
                .with_context(|| format!("unsupported FAKTUR_DEFAULT_CURRENCY: {raw}"))?,
            None => defaults.default_currency,
        };

        Ok(Self {
            data_dir,
            poll_interval,
            advancement,
            default_currency,
        })
    }
}

fn parse_advancement(value: &str) -> Result<Advancement> {
    match value.to_ascii_lowercase().as_str() {
        "calendar" => Ok(Advancement::CalendarUnits),
        "fixed-days" => Ok(Advancement::FixedDayCount),
        other => anyhow::bail!("unsupported FAKTUR_ADVANCEMENT: {other}"),
    }
}
