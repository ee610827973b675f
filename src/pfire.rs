//! pFIRE runner: invoke the tool on its own config file and scrape the log
//! for result paths.
//!
//! pFIRE reports where it wrote its outputs only through its log, via two
//! fixed marker lines. The exact wording is a contract with the external
//! tool and is tested as such.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::config::RegConfig;
use crate::error::{BenchError, Result};
use crate::harness::HarnessConfig;
use crate::invoke::{InvokeSpec, ToolInvoker};
use crate::result::RunResult;
use crate::runner::RegistrationRunner;

/// Log line prefix announcing the registered image path.
pub const REGISTERED_MARKER: &str = "Saved registered image to ";
/// Log line prefix announcing the deformation map path.
pub const MAP_MARKER: &str = "Saved map to ";

/// Runs the `pfire` binary on a registration config.
#[derive(Debug)]
pub struct PfireRunner<I> {
    invoker: I,
    command: String,
    timeout: Option<Duration>,
    /// Requested process count. Anything other than 1 is rejected; MPI runs
    /// are not supported.
    procs: u32,
}

impl<I: ToolInvoker> PfireRunner<I> {
    pub fn new(invoker: I, harness: &HarnessConfig, procs: u32) -> Self {
        Self {
            invoker,
            command: harness.pfire_command.clone(),
            timeout: harness.timeout(),
            procs,
        }
    }
}

impl<I: ToolInvoker> RegistrationRunner for PfireRunner<I> {
    fn tool_name(&self) -> &'static str {
        "pFIRE"
    }

    fn run(&self, config_path: &Path) -> Result<RunResult> {
        if self.procs != 1 {
            return Err(BenchError::NotSupported(
                "multi-process pFIRE runs are not supported".to_string(),
            ));
        }

        let config = RegConfig::load(config_path)?;
        let workdir = config.workdir();
        let config_name = config.file_name()?.to_string();
        info!(config = %config_name, workdir = %workdir.display(), "running pFIRE");

        let fixed_path = workdir.join(config.require("fixed")?);
        let moved_path = workdir.join(config.require("moved")?);
        if let Some(mask) = config.get("mask") {
            debug!(mask = %workdir.join(mask).display(), "mask configured");
        }

        // Log lands in the process CWD, named after the config file.
        let log_path = PathBuf::from(format!("{}_pfire.log", config.file_stem()?));
        fs::File::create(&log_path)
            .map_err(|e| BenchError::io(format!("create log {}", log_path.display()), e))?;

        // The tool reads the config itself; it gets the untranslated
        // filename and resolves paths from its own cwd.
        let outcome = self.invoker.invoke(&InvokeSpec {
            program: self.command.clone(),
            args: vec![config_name],
            workdir: Some(workdir.clone()),
            log_path: log_path.clone(),
            timeout: self.timeout,
        })?;
        if !outcome.success {
            return Err(BenchError::ToolExecution {
                tool: self.tool_name().to_string(),
                log_path,
                code: outcome.code,
            });
        }

        let contents = fs::read_to_string(&log_path)
            .map_err(|e| BenchError::io(format!("read log {}", log_path.display()), e))?;
        let (registered_path, map_path) = extract_result_paths(&contents, &workdir);
        if registered_path.is_none() && map_path.is_none() {
            return Err(BenchError::Extraction { log_path });
        }
        info!(
            registered = ?registered_path,
            map = ?map_path,
            "pFIRE run complete"
        );

        Ok(RunResult {
            registered_path,
            map_path,
            log_path,
            fixed_path: Some(fixed_path),
            moved_path: Some(moved_path),
        })
    }
}

/// Scan a pFIRE log for the two result markers.
///
/// Paths are joined with the run's working directory. A repeated marker
/// overwrites the earlier match; the expected log shape has each marker
/// exactly once.
pub fn extract_result_paths(
    log_contents: &str,
    workdir: &Path,
) -> (Option<PathBuf>, Option<PathBuf>) {
    let mut registered = None;
    let mut map = None;
    for line in log_contents.lines() {
        if let Some(rest) = line.strip_prefix(REGISTERED_MARKER) {
            registered = Some(workdir.join(rest.trim()));
        } else if let Some(rest) = line.strip_prefix(MAP_MARKER) {
            map = Some(workdir.join(rest.trim()));
        }
    }
    (registered, map)
}
