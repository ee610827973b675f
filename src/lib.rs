//! Benchmark harness for external image-registration tools.
//!
//! Wraps two command-line registration tools, pFIRE and ShIRT, behind one
//! [`runner::RegistrationRunner`] capability: translate a shared key=value
//! config into each tool's invocation contract, run the binary with its
//! output captured to a log file, and hand the produced paths back as a
//! [`result::RunResult`]. The registration math lives entirely in the
//! external binaries; this crate is format adaptation, subprocess plumbing,
//! and (for pFIRE) log scraping.
//!
//! Seams are traits so tests never need the real tools: [`invoke`] for
//! process spawning and [`image`] for pixel I/O.

pub mod config;
pub mod error;
pub mod harness;
pub mod image;
pub mod invoke;
pub mod logging;
pub mod pfire;
pub mod result;
pub mod runner;
pub mod shirt;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
