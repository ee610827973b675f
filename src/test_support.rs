//! Test-only helpers: scripted invoker and image I/O, plus small fixtures.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use ndarray::Array2;

use crate::error::{BenchError, Result};
use crate::image::ImageIo;
use crate::invoke::{InvokeOutcome, InvokeSpec, ToolInvoker};

/// Write a file into `dir` and return its path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture file");
    path
}

/// One scripted invocation outcome.
#[derive(Debug, Clone)]
pub struct ScriptedInvoke {
    pub code: i32,
    /// Appended to the spec's log file, standing in for tool output.
    pub log_contents: String,
}

impl ScriptedInvoke {
    pub fn success(log_contents: &str) -> Self {
        Self {
            code: 0,
            log_contents: log_contents.to_string(),
        }
    }

    pub fn failure(code: i32, log_contents: &str) -> Self {
        Self {
            code,
            log_contents: log_contents.to_string(),
        }
    }
}

/// Invoker that replays scripted outcomes and records every call.
#[derive(Debug, Default)]
pub struct ScriptedInvoker {
    script: RefCell<VecDeque<ScriptedInvoke>>,
    calls: RefCell<Vec<InvokeSpec>>,
}

impl ScriptedInvoker {
    pub fn push(&self, step: ScriptedInvoke) {
        self.script.borrow_mut().push_back(step);
    }

    pub fn calls(&self) -> Vec<InvokeSpec> {
        self.calls.borrow().clone()
    }
}

impl ToolInvoker for ScriptedInvoker {
    fn invoke(&self, spec: &InvokeSpec) -> Result<InvokeOutcome> {
        self.calls.borrow_mut().push(spec.clone());
        let step = self
            .script
            .borrow_mut()
            .pop_front()
            .expect("unscripted invoke");
        let mut log = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&spec.log_path)
            .expect("open scripted log");
        log.write_all(step.log_contents.as_bytes())
            .expect("write scripted log");
        Ok(InvokeOutcome {
            code: Some(step.code),
            success: step.code == 0,
            timed_out: false,
        })
    }
}

/// Image I/O that serves arrays from stubbed shapes and records traffic.
#[derive(Debug, Default)]
pub struct ScriptedImageIo {
    shapes: RefCell<HashMap<PathBuf, (usize, usize)>>,
    loads: RefCell<Vec<PathBuf>>,
    saves: RefCell<Vec<(PathBuf, Array2<f64>)>>,
}

impl ScriptedImageIo {
    /// Make `load(path)` return a zero array of the given shape.
    pub fn stub_shape(&self, path: &str, shape: (usize, usize)) {
        self.shapes
            .borrow_mut()
            .insert(PathBuf::from(path), shape);
    }

    pub fn loaded(&self, path: &Path) -> bool {
        self.loads.borrow().iter().any(|p| p == path)
    }

    pub fn save_paths(&self) -> Vec<PathBuf> {
        self.saves.borrow().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn saved(&self, path: &Path) -> Option<Array2<f64>> {
        self.saves
            .borrow()
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, data)| data.clone())
    }
}

impl ImageIo for ScriptedImageIo {
    fn load(&self, path: &Path) -> Result<Array2<f64>> {
        self.loads.borrow_mut().push(path.to_path_buf());
        let shape = self.shapes.borrow().get(path).copied();
        match shape {
            Some(shape) => Ok(Array2::zeros(shape)),
            None => Err(BenchError::Image {
                path: path.to_path_buf(),
                reason: "no scripted image".to_string(),
            }),
        }
    }

    fn save(&self, data: &Array2<f64>, path: &Path) -> Result<()> {
        self.saves
            .borrow_mut()
            .push((path.to_path_buf(), data.clone()));
        Ok(())
    }
}

static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Serialized current-directory switch for tests that exercise CWD-relative
/// log paths. Restores the previous directory on drop.
pub struct CwdGuard {
    _lock: MutexGuard<'static, ()>,
    previous: PathBuf,
}

impl CwdGuard {
    pub fn enter(dir: &Path) -> Self {
        let lock = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let previous = std::env::current_dir().expect("current dir");
        std::env::set_current_dir(dir).expect("enter test dir");
        Self {
            _lock: lock,
            previous,
        }
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.previous);
    }
}
