//! Dataset loading from a JSON bundle or a `window.NAME = ...;` data script

use crate::config::DataPaths;
use crate::data_ops::derive_totals;
use crate::utils::lookup;
use crate::{CertificateRecord, Dataset, EmailRecord};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value assigned to window.{name}: {source}")]
    ScriptValue {
        name: String,
        source: serde_json::Error,
    },

    #[error("data script assigns nothing (expected `window.NAME = <json>;`)")]
    EmptyScript,

    #[error("missing section `{0}`")]
    MissingSection(String),

    #[error("invalid section `{section}`: {source}")]
    InvalidSection {
        section: String,
        source: serde_json::Error,
    },
}

fn assignment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // constant pattern
        Regex::new(r"\bwindow\.([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*").expect("assignment pattern is valid")
    })
}

/// Read a data file and build the dataset
pub fn load_dataset(path: &Path, paths: &DataPaths) -> Result<Dataset, DatasetError> {
    let source = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bundle = parse_bundle(&source)?;
    let dataset = dataset_from_value(&bundle, paths)?;
    tracing::info!(
        path = %path.display(),
        groups = dataset.groups.len(),
        certificates = dataset.certificates.len(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Parse either a JSON document or a script of `window.NAME = <json>;` assignments.
/// Script assignments are collected into one object keyed by NAME.
pub fn parse_bundle(source: &str) -> Result<Value, DatasetError> {
    let trimmed = source.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }
    parse_script(trimmed)
}

fn parse_script(source: &str) -> Result<Value, DatasetError> {
    let re = assignment_regex();
    let mut bundle = Map::new();
    let mut pos = 0;

    while let Some(caps) = re.captures_at(source, pos) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let value_start = whole.end();
        let mut stream = serde_json::Deserializer::from_str(&source[value_start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value)) => {
                bundle.insert(name.as_str().to_string(), value);
                pos = value_start + stream.byte_offset();
            }
            Some(Err(err)) => {
                return Err(DatasetError::ScriptValue {
                    name: name.as_str().to_string(),
                    source: err,
                })
            }
            None => break,
        }
    }

    if bundle.is_empty() {
        return Err(DatasetError::EmptyScript);
    }
    Ok(Value::Object(bundle))
}

fn section<T: DeserializeOwned>(bundle: &Value, path: &str) -> Result<Option<T>, DatasetError> {
    match lookup(bundle, path) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::deserialize(value)
            .map(Some)
            .map_err(|source| DatasetError::InvalidSection {
                section: path.to_string(),
                source,
            }),
    }
}

/// Build a dataset from a parsed bundle. Only the data section is required.
pub fn dataset_from_value(bundle: &Value, paths: &DataPaths) -> Result<Dataset, DatasetError> {
    let emails: HashMap<String, Vec<EmailRecord>> = section(bundle, paths.data())?
        .ok_or_else(|| DatasetError::MissingSection(paths.data().to_string()))?;

    let groups = match section::<Vec<String>>(bundle, paths.groups())? {
        Some(groups) => groups,
        None => {
            let mut names: Vec<String> = emails.keys().cloned().collect();
            names.sort();
            tracing::debug!("no group list; using data keys in alphabetical order");
            names
        }
    };

    let totals = match section::<HashMap<String, u64>>(bundle, paths.totals())? {
        Some(totals) => totals,
        None => {
            tracing::debug!("no totals section; summing opens per group");
            derive_totals(&emails)
        }
    };

    let certificates: Vec<CertificateRecord> =
        section(bundle, paths.certificates())?.unwrap_or_default();

    warn_on_inconsistencies(&groups, &emails);

    Ok(Dataset {
        groups,
        emails,
        totals,
        certificates,
    })
}

fn warn_on_inconsistencies(groups: &[String], emails: &HashMap<String, Vec<EmailRecord>>) {
    let mut seen = HashSet::new();
    for group in groups {
        for email in emails.get(group).into_iter().flatten() {
            if !seen.insert(email.id) {
                tracing::warn!(id = email.id, group = %group, "duplicate email id");
            }
        }
    }
    let listed: HashSet<&str> = groups.iter().map(String::as_str).collect();
    for name in emails.keys().filter(|k| !listed.contains(k.as_str())) {
        tracing::warn!(group = %name, "group has records but is not listed; it will not be shown");
    }
}
