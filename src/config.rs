//! Registration config files: `key = value` text shared by both tools.
//!
//! The format is an external contract (the same file is handed verbatim to
//! pFIRE), so parsing stays deliberately simple: one pair per line, `#`
//! comments, optional surrounding quotes on values. Paths inside the file
//! are relative to the config file's directory for pFIRE and to the process
//! CWD for ShIRT; resolution is the caller's job via [`RegConfig::workdir`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{BenchError, Result};

/// A loaded registration config: raw key/value pairs plus the file they
/// came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegConfig {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl RegConfig {
    /// Load and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| BenchError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let values = parse_pairs(&contents).map_err(|reason| BenchError::Config {
            path: path.to_path_buf(),
            reason,
        })?;
        debug!(path = %path.display(), keys = values.len(), "loaded config");
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    /// The config file path as given by the caller.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the config file. Empty parent (a bare filename)
    /// resolves to `.` so it stays usable as a subprocess cwd.
    pub fn workdir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Config file name without its directory.
    pub fn file_name(&self) -> Result<&str> {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| BenchError::Config {
                path: self.path.clone(),
                reason: "config path has no file name".to_string(),
            })
    }

    /// Config file name with its extension dropped.
    pub fn file_stem(&self) -> Result<&str> {
        self.path
            .file_stem()
            .and_then(|n| n.to_str())
            .ok_or_else(|| BenchError::Config {
                path: self.path.clone(),
                reason: "config path has no file stem".to_string(),
            })
    }

    /// Optional key lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Required key lookup; absence is a config error naming the key.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| BenchError::MissingKey {
            key: key.to_string(),
            path: self.path.clone(),
        })
    }

    /// Overlay this config onto a set of default pairs: configured keys win,
    /// defaults fill the gaps. Used by the ShIRT runner so optional keys
    /// resolve predictably.
    pub fn merged_over(&self, defaults: &[(&str, Option<&str>)]) -> Self {
        let mut values = BTreeMap::new();
        for (key, value) in defaults {
            if let Some(value) = value {
                values.insert((*key).to_string(), (*value).to_string());
            }
        }
        for (key, value) in &self.values {
            values.insert(key.clone(), value.clone());
        }
        Self {
            path: self.path.clone(),
            values,
        }
    }
}

fn parse_pairs(contents: &str) -> std::result::Result<BTreeMap<String, String>, String> {
    let mut values = BTreeMap::new();
    for (lineno, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(format!("line {}: expected `key = value`", lineno + 1));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("line {}: empty key", lineno + 1));
        }
        values.insert(key.to_string(), unquote(value.trim()).to_string());
    }
    Ok(values)
}

/// Strip one layer of matching single or double quotes.
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
