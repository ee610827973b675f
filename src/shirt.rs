//! ShIRT runner: input conversion, default mask synthesis, and the tool's
//! positional CLI grammar.
//!
//! ShIRT accepts a pFIRE-style config but wants its inputs in its native
//! `.image` format and reports nothing through its log; output names are a
//! deterministic function of the config filename. Paths here are relative
//! to the process CWD, which is also where `setpath DataPath .` points the
//! tool.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::config::RegConfig;
use crate::error::{BenchError, Result};
use crate::harness::HarnessConfig;
use crate::image::ImageIo;
use crate::invoke::{InvokeSpec, ToolInvoker};
use crate::result::RunResult;
use crate::runner::RegistrationRunner;

/// Keys the config is merged over before lookup; `mask` stays optional.
const CONFIG_DEFAULTS: [(&str, Option<&str>); 1] = [("mask", None)];

/// Runs the `ShIRT` binary on a registration config.
#[derive(Debug)]
pub struct ShirtRunner<I, M> {
    invoker: I,
    image_io: M,
    command: String,
    timeout: Option<Duration>,
    default_mask_name: String,
}

impl<I: ToolInvoker, M: ImageIo> ShirtRunner<I, M> {
    pub fn new(invoker: I, image_io: M, harness: &HarnessConfig) -> Self {
        Self {
            invoker,
            image_io,
            command: harness.shirt_command.clone(),
            timeout: harness.timeout(),
            default_mask_name: harness.default_mask_name.clone(),
        }
    }

    /// Ensure an input is available in native format, converting if needed.
    /// Returns the path actually handed to the tool.
    fn ensure_native(&self, configured: &str) -> Result<String> {
        if configured.ends_with(".image") {
            return Ok(configured.to_string());
        }
        let data = self.image_io.load(Path::new(configured))?;
        let native = Path::new(configured)
            .with_extension("image")
            .display()
            .to_string();
        self.image_io.save(&data, Path::new(&native))?;
        debug!(from = configured, to = %native, "converted input to native format");
        Ok(native)
    }

    /// Build a full-coverage mask matching the fixed image's shape.
    fn synthesize_mask(&self, fixed_configured: &str) -> Result<String> {
        let data = self.image_io.load(Path::new(fixed_configured))?;
        let mask = Array2::from_elem(data.dim(), 1.0);
        self.image_io.save(&mask, Path::new(&self.default_mask_name))?;
        info!(mask = %self.default_mask_name, "synthesized default mask");
        Ok(self.default_mask_name.clone())
    }
}

impl<I: ToolInvoker, M: ImageIo> RegistrationRunner for ShirtRunner<I, M> {
    fn tool_name(&self) -> &'static str {
        "ShIRT"
    }

    fn run(&self, config_path: &Path) -> Result<RunResult> {
        let config = RegConfig::load(config_path)?.merged_over(&CONFIG_DEFAULTS);
        info!(config = %config_path.display(), "running ShIRT");

        let base_name = sanitized_base_name(config.file_stem()?);
        let registered_path = format!("shirt_{base_name}_registered.image");
        let map_path = format!("shirt_{base_name}_map.map");

        let fixed_path = self.ensure_native(config.require("fixed")?)?;
        let moved_path = self.ensure_native(config.require("moved")?)?;
        let mask_path = match config.get("mask") {
            Some(mask) => self.ensure_native(mask)?,
            None => self.synthesize_mask(config.require("fixed")?)?,
        };
        let nodespacing = config.require("nodespacing")?.to_string();

        let log_path = PathBuf::from(format!(
            "{}_shirt.log",
            config_path.with_extension("").display()
        ));
        fs::File::create(&log_path)
            .map_err(|e| BenchError::io(format!("create log {}", log_path.display()), e))?;

        // Point the tool's data path at the CWD before registering. A
        // failure here is logged but not fatal; the register call is the
        // one whose status matters.
        let setpath = self.invoker.invoke(&InvokeSpec {
            program: self.command.clone(),
            args: vec![
                "setpath".to_string(),
                "DataPath".to_string(),
                ".".to_string(),
            ],
            workdir: None,
            log_path: log_path.clone(),
            timeout: self.timeout,
        })?;
        if !setpath.success {
            warn!(code = ?setpath.code, "ShIRT setpath exited nonzero, continuing");
        }

        let args = vec![
            "Register".to_string(),
            "verbose".to_string(),
            "Fixed".to_string(),
            strip_extension(&fixed_path, ".image"),
            "Moved".to_string(),
            strip_extension(&moved_path, ".image"),
            "Mask".to_string(),
            strip_extension(&mask_path, ".mask"),
            "NodeSpacing".to_string(),
            nodespacing,
            "Registered".to_string(),
            strip_extension(&registered_path, ".image"),
            "Map".to_string(),
            strip_extension(&map_path, ".map"),
        ];
        let outcome = self.invoker.invoke(&InvokeSpec {
            program: self.command.clone(),
            args,
            workdir: None,
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
        info!(registered = %registered_path, map = %map_path, "ShIRT run complete");

        Ok(RunResult {
            registered_path: Some(PathBuf::from(registered_path)),
            map_path: Some(PathBuf::from(map_path)),
            log_path,
            fixed_path: Some(PathBuf::from(fixed_path)),
            moved_path: Some(PathBuf::from(moved_path)),
        })
    }
}

/// Config file stem with every remaining literal `.` replaced by `_`, so
/// output names derived from it stay unambiguous for the tool.
fn sanitized_base_name(stem: &str) -> String {
    stem.replace('.', "_")
}

/// Remove a known native extension. ShIRT appends its own extension
/// conventions, so arguments carry bare stems.
fn strip_extension(path: &str, ext: &str) -> String {
    path.replace(ext, "")
}
