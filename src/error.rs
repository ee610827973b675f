//! Error taxonomy for registration runs.
//!
//! Every failure surfaces immediately to the caller; there is no retry or
//! partial recovery. Tool failures always name the log file so a human can
//! read the external tool's own diagnostics. Log files are never deleted.

use std::path::PathBuf;

/// Errors produced while preparing for or running a registration tool.
#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    /// Config file could not be read or parsed as key=value text.
    #[error("invalid config {path}: {reason}")]
    Config {
        /// Path to the offending config file.
        path: PathBuf,
        reason: String,
    },

    /// A required config key was absent.
    #[error("missing config key `{key}` in {path}")]
    MissingKey { key: String, path: PathBuf },

    /// The requested invocation mode is not implemented.
    #[error("{0}")]
    NotSupported(String),

    /// The external tool exited nonzero or timed out.
    #[error("failed to run {tool}, check log for details: {log_path}")]
    ToolExecution {
        tool: String,
        /// Log holding the tool's combined stdout/stderr for this run.
        log_path: PathBuf,
        /// Exit code, when the process exited rather than timing out.
        code: Option<i32>,
    },

    /// Neither result marker was found in the pFIRE log.
    #[error("failed to extract result path(s) from log {log_path}")]
    Extraction { log_path: PathBuf },

    /// Image collaborator failure (decode, encode, or native-format parse).
    #[error("image i/o failed for {path}: {reason}")]
    Image { path: PathBuf, reason: String },

    /// Filesystem or process-spawn failure.
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl BenchError {
    /// Wrap an I/O error with a short human-readable context line.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_execution_display_names_log_path() {
        let err = BenchError::ToolExecution {
            tool: "pfire".to_string(),
            log_path: PathBuf::from("/work/run1_pfire.log"),
            code: Some(2),
        };
        assert!(err.to_string().contains("/work/run1_pfire.log"));
    }

    #[test]
    fn extraction_display_names_log_path() {
        let err = BenchError::Extraction {
            log_path: PathBuf::from("run1_pfire.log"),
        };
        assert!(err.to_string().contains("run1_pfire.log"));
        assert!(err.to_string().contains("extract result path"));
    }
}
