//! Benchmark harness CLI for the pFIRE and ShIRT registration tools.
//!
//! Runs one tool on one config file and prints the produced paths, either
//! line-by-line or as JSON. Tool commands and the optional timeout come
//! from an optional harness TOML file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use regbench::harness::load_harness_config;
use regbench::image::DiskImageIo;
use regbench::invoke::ProcessInvoker;
use regbench::pfire::PfireRunner;
use regbench::result::RunResult;
use regbench::runner::RegistrationRunner;
use regbench::shirt::ShirtRunner;

#[derive(Parser)]
#[command(
    name = "regbench",
    version,
    about = "Benchmark harness for pFIRE and ShIRT image registration"
)]
struct Cli {
    /// Harness settings file (tool commands, timeout).
    #[arg(long, default_value = "regbench.toml")]
    harness: PathBuf,

    /// Print the result as JSON instead of labeled lines.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run pFIRE on a config file and scrape its log for output paths.
    Pfire {
        config: PathBuf,
        /// Process count; only 1 is supported.
        #[arg(long, default_value_t = 1)]
        procs: u32,
    },
    /// Run ShIRT on a pFIRE-style config file.
    Shirt { config: PathBuf },
}

fn main() {
    regbench::logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let harness = load_harness_config(&cli.harness).context("load harness config")?;

    let result = match &cli.command {
        Command::Pfire { config, procs } => {
            PfireRunner::new(ProcessInvoker, &harness, *procs).run(config)?
        }
        Command::Shirt { config } => {
            ShirtRunner::new(ProcessInvoker, DiskImageIo, &harness).run(config)?
        }
    };

    print_result(&result, cli.json)
}

fn print_result(result: &RunResult, json: bool) -> Result<()> {
    if json {
        let mut payload = serde_json::to_string_pretty(result).context("serialize result")?;
        payload.push('\n');
        print!("{payload}");
        return Ok(());
    }
    for line in result.display_lines() {
        println!("{line}");
    }
    Ok(())
}
