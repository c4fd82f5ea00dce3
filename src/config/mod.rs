//! Configuration loading for maildash

mod schema;

pub use schema::{
    Config, DashboardConfig, DataPaths, EngagementThresholds, InstitutionStyle, InstitutionTable,
    DEFAULT_CHART_SCRIPT, DEFAULT_MAX_DISPLAY_ITEMS, DEFAULT_SEARCH_DELAY_MS, DEFAULT_TITLE,
};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".maildashrc.json";

/// A resolved config chain and the file it was read from
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: Config,
    /// None when no config file was found
    pub source: Option<PathBuf>,
}

/// Path of the config file to use: `custom_path` (relative to `work_dir`),
/// else the nearest `.maildashrc.json` in `work_dir` or its parents.
pub fn locate_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<Option<PathBuf>> {
    match custom_path {
        Some(p) => {
            let path = work_dir.join(p);
            anyhow::ensure!(path.is_file(), "Config file not found: {}", path.display());
            Ok(Some(path))
        }
        None => Ok(find_config_in_parents(work_dir)),
    }
}

/// Locate and read the config, following its extends chain
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<LoadedConfig> {
    let Some(path) = locate_config(work_dir, custom_path)? else {
        tracing::debug!(dir = %work_dir.display(), "no config file; using defaults");
        return Ok(LoadedConfig::default());
    };
    let config = read_chain(&path)?;
    Ok(LoadedConfig {
        config,
        source: Some(path),
    })
}

/// Read `path` and every file it extends. Nearer files win on conflicts.
fn read_chain(path: &Path) -> Result<Config> {
    let mut seen: Vec<PathBuf> = Vec::new();
    let mut merged: Option<Config> = None;
    let mut next = Some(path.to_path_buf());

    while let Some(current) = next.take() {
        let key = current.canonicalize().unwrap_or_else(|_| current.clone());
        if seen.contains(&key) {
            let cycle: Vec<String> = seen
                .iter()
                .chain(std::iter::once(&key))
                .map(|p| p.display().to_string())
                .collect();
            anyhow::bail!("Circular extends detected in config: {}", cycle.join(" -> "));
        }
        seen.push(key);

        let mut config = read_one(&current)?;
        next = match config.extends.take() {
            Some(base) => Some(extends_target(&current, &base)?),
            None => None,
        };
        tracing::debug!(path = %current.display(), "config read");

        merged = Some(match merged {
            Some(mut child) => {
                child.merge_from(config);
                child
            }
            None => config,
        });
    }

    Ok(merged.unwrap_or_default())
}

fn read_one(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config: {}", path.display()))
}

/// File named by an `extends` entry; relative to the extending file, `.json` implied
fn extends_target(from: &Path, extends: &str) -> Result<PathBuf> {
    let dir = from.parent().unwrap_or(Path::new("."));
    let mut target = dir.join(extends);
    if target.extension().is_none() {
        target.set_extension("json");
    }
    anyhow::ensure!(
        target.is_file(),
        "Extended config not found: {} (referenced from {})",
        target.display(),
        from.display()
    );
    Ok(target)
}

/// Nearest `.maildashrc.json` in `dir` or its parents
fn find_config_in_parents(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .map(|d| d.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

/// Starter config written by `maildash init`
pub fn default_config_json() -> String {
    format!(
        r##"{{
  "title": "{DEFAULT_TITLE}",
  "engagement": {{ "high": 100, "medium": 20 }},
  "searchDelayMs": {DEFAULT_SEARCH_DELAY_MS},
  "maxDisplayItems": {DEFAULT_MAX_DISPLAY_ITEMS},
  "institutions": {{
    "Other": {{ "icon": "OTH", "color": "#6e7681", "className": "inst-other" }}
  }},
  "dataPaths": {{
    "groups": "emailGroups",
    "data": "emailData",
    "totals": "groupTotals",
    "certificates": "certificateData"
  }}
}}
"##
    )
}
