use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const CONFIG_ENV: &str = "RENTAL_BI_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "rental_bi.json";

const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
const DEFAULT_TREND_LEN: usize = 3;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Run settings. Every field has a default, so an empty `{}` file or no
/// file at all is valid.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub reservations_path: PathBuf,
    pub targets_path: PathBuf,
    pub cost_history_path: PathBuf,
    pub output_dir: PathBuf,
    /// How long a loaded snapshot is reused before the next report reloads it.
    pub cache_ttl_secs: u64,
    /// Number of months in each trend series.
    pub trend_len: usize,
    pub log_level: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            reservations_path: PathBuf::from("reservas.csv"),
            targets_path: PathBuf::from("base_niveis.csv"),
            cost_history_path: PathBuf::from("historico_unidades.csv"),
            output_dir: PathBuf::from("."),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            trend_len: DEFAULT_TREND_LEN,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ReportConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// `$RENTAL_BI_CONFIG` if set, else `rental_bi.json` in the working
    /// directory if present, else defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if path.exists() {
            info!(path = %path.display(), "loading config");
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}
