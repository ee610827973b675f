//! Harness settings (TOML).
//!
//! Controls how the external tools are launched — command names and an
//! optional wall-clock bound — without touching the registration configs
//! themselves. Intended to be edited by humans; missing fields (or a
//! missing file) fall back to defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HarnessConfig {
    /// Command used to launch pFIRE.
    pub pfire_command: String,

    /// Command used to launch ShIRT.
    pub shirt_command: String,

    /// Kill a tool after this many seconds; 0 means wait forever.
    pub tool_timeout_secs: u64,

    /// File name for the synthesized full-coverage mask.
    pub default_mask_name: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            pfire_command: "pfire".to_string(),
            shirt_command: "ShIRT".to_string(),
            tool_timeout_secs: 0,
            default_mask_name: "default_mask.mask".to_string(),
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.pfire_command.trim().is_empty() {
            return Err(anyhow!("pfire_command must be non-empty"));
        }
        if self.shirt_command.trim().is_empty() {
            return Err(anyhow!("shirt_command must be non-empty"));
        }
        if self.default_mask_name.trim().is_empty() {
            return Err(anyhow!("default_mask_name must be non-empty"));
        }
        Ok(())
    }

    /// Timeout to hand to the invoker, `None` when unbounded.
    pub fn timeout(&self) -> Option<Duration> {
        (self.tool_timeout_secs > 0).then(|| Duration::from_secs(self.tool_timeout_secs))
    }
}

/// Load harness settings from a TOML file.
///
/// If the file is missing, returns `HarnessConfig::default()`.
pub fn load_harness_config(path: &Path) -> Result<HarnessConfig> {
    if !path.exists() {
        let cfg = HarnessConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: HarnessConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
