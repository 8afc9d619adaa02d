use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use surge_platform::{EnergyEstimator, ProcessError};
use tracing::debug;

use crate::config::{cache_dir, UserConfig};

/// One row of the process table: a platform sample decorated with the
/// resolved application identity.
#[derive(Debug, Clone)]
pub struct ProcessRow {
    pub pid: u32,
    pub name: String,
    pub bundle_id: Option<String>,
    pub cpu_usage_percent: f64,
    pub estimated_power_mw: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AppIdentity {
    display_name: String,
    bundle_id: Option<String>,
}

pub struct ProcessData {
    estimator: EnergyEstimator,
    pub processes: Vec<ProcessRow>,
    identity_cache: HashMap<String, AppIdentity>,
    excluded: Vec<String>,
}

impl ProcessData {
    pub fn new(config: &UserConfig) -> Self {
        Self {
            estimator: EnergyEstimator::with_tuning(
                config.milliwatts_per_cpu_percent,
                config.usage_threshold_percent,
            ),
            processes: Vec::new(),
            identity_cache: load_identity_cache(),
            excluded: config.excluded_processes.clone(),
        }
    }

    pub fn refresh(&mut self) {
        let samples = self.estimator.refresh();
        debug!(emitted = samples.len(), tracked = self.estimator.tracked_pids(), "process refresh");

        let mut cache_updated = false;
        let mut rows = Vec::with_capacity(samples.len());

        for sample in samples {
            if self.is_excluded(&sample.name) {
                continue;
            }

            let identity = match sample.exe.as_deref() {
                Some(exe) => {
                    let (identity, updated) =
                        self.resolve_identity(exe, &sample.name);
                    cache_updated |= updated;
                    identity
                }
                None => AppIdentity {
                    display_name: sample.name.clone(),
                    bundle_id: None,
                },
            };

            rows.push(ProcessRow {
                pid: sample.pid,
                name: identity.display_name,
                bundle_id: identity.bundle_id,
                cpu_usage_percent: sample.cpu_usage_percent,
                estimated_power_mw: sample.estimated_power_mw,
            });
        }

        if cache_updated {
            save_identity_cache(&self.identity_cache);
        }

        self.processes = rows;
    }

    fn is_excluded(&self, name: &str) -> bool {
        name_is_excluded(&self.excluded, name)
    }

    fn resolve_identity(&mut self, exe: &Path, binary_name: &str) -> (AppIdentity, bool) {
        let key = exe.to_string_lossy().to_string();
        if let Some(cached) = self.identity_cache.get(&key) {
            return (cached.clone(), false);
        }

        let identity = read_bundle_identity(exe).unwrap_or_else(|| AppIdentity {
            display_name: binary_name.to_string(),
            bundle_id: None,
        });
        self.identity_cache.insert(key, identity.clone());
        (identity, true)
    }

    /// Best-effort termination, surfaced to the caller for inline display.
    pub fn terminate(&self, pid: u32) -> Result<(), ProcessError> {
        self.estimator.terminate(pid)
    }
}

fn name_is_excluded(excluded: &[String], name: &str) -> bool {
    excluded
        .iter()
        .any(|excluded| excluded.eq_ignore_ascii_case(name))
}

/// Root of the `.app` bundle that owns `path`, if any.
fn app_bundle_root(path: &str) -> Option<&str> {
    let idx = path.find(".app/")?;
    Some(&path[..idx + 4])
}

/// Display name and bundle identifier from the owning bundle's Info.plist.
fn read_bundle_identity(exe: &Path) -> Option<AppIdentity> {
    let path_str = exe.to_string_lossy();
    let bundle_root = app_bundle_root(&path_str)?;
    let info_plist = PathBuf::from(bundle_root).join("Contents/Info.plist");

    if !info_plist.exists() {
        return None;
    }

    let value = plist::Value::from_file(&info_plist).ok()?;
    let dict = value.as_dictionary()?;

    let display_name = ["CFBundleDisplayName", "CFBundleName"]
        .iter()
        .find_map(|key| {
            dict.get(*key)
                .and_then(|v| v.as_string())
                .filter(|s| !s.is_empty())
        })?
        .to_string();

    let bundle_id = dict
        .get("CFBundleIdentifier")
        .and_then(|v| v.as_string())
        .map(String::from);

    Some(AppIdentity {
        display_name,
        bundle_id,
    })
}

fn identity_cache_path() -> PathBuf {
    cache_dir().join("app_identities.json")
}

fn load_identity_cache() -> HashMap<String, AppIdentity> {
    let path = identity_cache_path();
    if !path.exists() {
        return HashMap::new();
    }

    match fs::read_to_string(&path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => HashMap::new(),
    }
}

fn save_identity_cache(cache: &HashMap<String, AppIdentity>) {
    let path = identity_cache_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    if let Ok(content) = serde_json::to_string(cache) {
        let _ = fs::write(path, content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_bundle_root_extraction() {
        assert_eq!(
            app_bundle_root("/Applications/Safari.app/Contents/MacOS/Safari"),
            Some("/Applications/Safari.app")
        );
        assert_eq!(app_bundle_root("/usr/bin/top"), None);
    }

    #[test]
    fn test_bundle_identity_requires_a_bundle() {
        assert!(read_bundle_identity(Path::new("/usr/bin/top")).is_none());
    }

    #[test]
    fn test_exclusions_are_case_insensitive() {
        let excluded = vec!["Spotlight".to_string()];
        assert!(name_is_excluded(&excluded, "spotlight"));
        assert!(!name_is_excluded(&excluded, "Finder"));
    }
}
