//! The common runner capability.
//!
//! Each tool adapter implements [`RegistrationRunner`] independently; the
//! caller composes them, rather than one object carrying both behaviours.

use std::path::Path;

use crate::error::Result;
use crate::result::RunResult;

/// Run one external registration tool against a config file.
pub trait RegistrationRunner {
    /// Human-readable tool name for messages.
    fn tool_name(&self) -> &'static str;

    /// Prepare inputs, invoke the tool, and collect produced paths.
    fn run(&self, config_path: &Path) -> Result<RunResult>;
}
