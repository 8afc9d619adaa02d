use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "off" => LogLevel::Off,
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => LogLevel::Info,
        }
    }

    pub fn as_tracing_level(&self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Seconds between power-source samples.
    pub power_refresh_secs: u64,
    /// Seconds between process-energy samples.
    pub process_refresh_secs: u64,
    /// Processes below this CPU percentage are dropped from the table.
    pub usage_threshold_percent: f64,
    /// Linear CPU%-to-power coefficient. A heuristic, not a measurement.
    pub milliwatts_per_cpu_percent: f64,
    /// Process names hidden from the table.
    #[serde(default)]
    pub excluded_processes: Vec<String>,
    pub log_level: LogLevel,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            power_refresh_secs: 5,
            process_refresh_secs: 5,
            usage_threshold_percent: 0.5,
            milliwatts_per_cpu_percent: 50.0,
            excluded_processes: Vec::new(),
            log_level: LogLevel::Info,
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("surge")
}

pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("~/.cache"))
        .join("surge")
}

pub fn runtime_dir() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("surge")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn ensure_dirs() -> std::io::Result<()> {
    fs::create_dir_all(config_dir())?;
    fs::create_dir_all(cache_dir())?;
    Ok(())
}

impl UserConfig {
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> std::io::Result<()> {
        let _ = ensure_dirs();
        let path = config_path();
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        fs::write(path, content)
    }

    /// Apply CLI overrides on top of the loaded config.
    pub fn merge_with_args(&mut self, refresh_secs: Option<u64>, threshold: Option<f64>) {
        if let Some(secs) = refresh_secs {
            self.power_refresh_secs = secs;
            self.process_refresh_secs = secs;
        }
        if let Some(threshold) = threshold {
            self.usage_threshold_percent = threshold;
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_sampling_contract() {
        let config = UserConfig::default();
        assert_eq!(config.power_refresh_secs, 5);
        assert_eq!(config.process_refresh_secs, 5);
        assert_eq!(config.usage_threshold_percent, 0.5);
        assert_eq!(config.milliwatts_per_cpu_percent, 50.0);
    }

    #[test]
    fn test_merge_with_args_overrides_both_cadences() {
        let mut config = UserConfig::default();
        config.merge_with_args(Some(2), None);
        assert_eq!(config.power_refresh_secs, 2);
        assert_eq!(config.process_refresh_secs, 2);

        config.merge_with_args(None, Some(1.0));
        assert_eq!(config.usage_threshold_percent, 1.0);
        assert_eq!(config.power_refresh_secs, 2);
    }

    #[test]
    fn test_unknown_log_level_falls_back_to_info() {
        assert_eq!(LogLevel::from_str("bogus"), LogLevel::Info);
        assert_eq!(LogLevel::from_str("trace"), LogLevel::Trace);
        assert!(LogLevel::Off.as_tracing_level().is_none());
    }
}
