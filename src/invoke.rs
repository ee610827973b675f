//! Subprocess invocation with log capture.
//!
//! The [`ToolInvoker`] trait decouples the runners from actual process
//! spawning so tests can script outcomes without external binaries. The
//! real implementation redirects the child's stdout and stderr into the
//! run's log file and blocks until exit, with an optional wall-clock bound.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::error::{BenchError, Result};

/// One external tool invocation.
#[derive(Debug, Clone)]
pub struct InvokeSpec {
    /// Program name or path.
    pub program: String,
    pub args: Vec<String>,
    /// Working directory for the child; `None` inherits the process CWD.
    pub workdir: Option<PathBuf>,
    /// Log file receiving the child's combined stdout/stderr. Opened in
    /// append-create mode so sequential calls share one log.
    pub log_path: PathBuf,
    /// Kill the child after this long; `None` waits forever.
    pub timeout: Option<Duration>,
}

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvokeOutcome {
    /// Exit code, absent when killed by a signal or after a timeout.
    pub code: Option<i32>,
    pub success: bool,
    pub timed_out: bool,
}

pub trait ToolInvoker {
    fn invoke(&self, spec: &InvokeSpec) -> Result<InvokeOutcome>;
}

/// Invoker that spawns real processes.
#[derive(Debug, Default)]
pub struct ProcessInvoker;

impl ToolInvoker for ProcessInvoker {
    fn invoke(&self, spec: &InvokeSpec) -> Result<InvokeOutcome> {
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&spec.log_path)
            .map_err(|e| BenchError::io(format!("open log {}", spec.log_path.display()), e))?;
        let log_err = log
            .try_clone()
            .map_err(|e| BenchError::io(format!("clone log {}", spec.log_path.display()), e))?;

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err));
        if let Some(dir) = &spec.workdir {
            cmd.current_dir(dir);
        }

        debug!(program = %spec.program, args = ?spec.args, "spawning tool");
        let mut child = cmd
            .spawn()
            .map_err(|e| BenchError::io(format!("spawn {}", spec.program), e))?;

        let status = match spec.timeout {
            Some(timeout) => {
                match child
                    .wait_timeout(timeout)
                    .map_err(|e| BenchError::io(format!("wait for {}", spec.program), e))?
                {
                    Some(status) => status,
                    None => {
                        warn!(
                            program = %spec.program,
                            timeout_secs = timeout.as_secs(),
                            "tool timed out, killing"
                        );
                        child
                            .kill()
                            .map_err(|e| BenchError::io(format!("kill {}", spec.program), e))?;
                        child.wait().map_err(|e| {
                            BenchError::io(format!("wait {} after kill", spec.program), e)
                        })?;
                        return Ok(InvokeOutcome {
                            code: None,
                            success: false,
                            timed_out: true,
                        });
                    }
                }
            }
            None => child
                .wait()
                .map_err(|e| BenchError::io(format!("wait for {}", spec.program), e))?,
        };

        debug!(program = %spec.program, exit_code = ?status.code(), "tool finished");
        Ok(InvokeOutcome {
            code: status.code(),
            success: status.success(),
            timed_out: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[cfg(unix)]
    #[test]
    fn invoke_captures_stdout_and_stderr_in_log() {
        let temp = tempfile::tempdir().expect("tempdir");
        let log_path = temp.path().join("tool.log");
        let spec = InvokeSpec {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "echo out-line; echo err-line >&2".to_string(),
            ],
            workdir: Some(temp.path().to_path_buf()),
            log_path: log_path.clone(),
            timeout: None,
        };

        let outcome = ProcessInvoker.invoke(&spec).expect("invoke");
        assert!(outcome.success);
        let log = fs::read_to_string(&log_path).expect("read log");
        assert!(log.contains("out-line"));
        assert!(log.contains("err-line"));
    }

    #[cfg(unix)]
    #[test]
    fn invoke_reports_nonzero_exit() {
        let temp = tempfile::tempdir().expect("tempdir");
        let spec = InvokeSpec {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "exit 3".to_string()],
            workdir: None,
            log_path: temp.path().join("tool.log"),
            timeout: None,
        };

        let outcome = ProcessInvoker.invoke(&spec).expect("invoke");
        assert!(!outcome.success);
        assert_eq!(outcome.code, Some(3));
        assert!(!outcome.timed_out);
    }

    #[cfg(unix)]
    #[test]
    fn invoke_kills_on_timeout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let spec = InvokeSpec {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "sleep 30".to_string()],
            workdir: None,
            log_path: temp.path().join("tool.log"),
            timeout: Some(Duration::from_millis(100)),
        };

        let outcome = ProcessInvoker.invoke(&spec).expect("invoke");
        assert!(outcome.timed_out);
        assert!(!outcome.success);
    }

    #[test]
    fn invoke_missing_program_is_io_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let spec = InvokeSpec {
            program: "definitely-not-a-real-tool".to_string(),
            args: Vec::new(),
            workdir: None,
            log_path: temp.path().join("tool.log"),
            timeout: None,
        };

        let err = ProcessInvoker.invoke(&spec).unwrap_err();
        assert!(err.to_string().contains("spawn"));
    }
}
