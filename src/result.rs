//! Per-invocation result struct.
//!
//! Deliberately a plain value returned from each run rather than state on
//! the runner, so reusing one runner across configs cannot leak paths from
//! an earlier run.

use std::path::PathBuf;

use serde::Serialize;

/// Paths produced by one registration run.
///
/// `registered_path`/`map_path` come from log scraping for pFIRE (either may
/// be absent when the tool reported only one of them) and are deterministic
/// for ShIRT. `fixed_path`/`moved_path` are the inputs actually handed to
/// the tool, after any resolution or format conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub registered_path: Option<PathBuf>,
    pub map_path: Option<PathBuf>,
    pub log_path: PathBuf,
    pub fixed_path: Option<PathBuf>,
    pub moved_path: Option<PathBuf>,
}

impl RunResult {
    /// Lines for human-readable CLI output, one labeled path per entry.
    pub fn display_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(path) = &self.registered_path {
            lines.push(format!("registered: {}", path.display()));
        }
        if let Some(path) = &self.map_path {
            lines.push(format!("map: {}", path.display()));
        }
        lines.push(format!("log: {}", self.log_path.display()));
        if let Some(path) = &self.fixed_path {
            lines.push(format!("fixed: {}", path.display()));
        }
        if let Some(path) = &self.moved_path {
            lines.push(format!("moved: {}", path.display()));
        }
        lines
    }
}
