//! `multipid` – demonstration and verification harness for the
//! multi-variable PID controller.
//!
//! ```text
//! multipid check            run the built-in numeric checks
//! multipid run  [CONFIG]    closed-loop simulation (default ./multipid.toml)
//! multipid init [CONFIG]    write the default configuration
//! ```
//!
//! Ctrl-C during `run` stops the loop after the current cycle and still
//! prints the summary.

mod check;
mod config;
mod simulation;
mod telemetry;

use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use simulation::FirstOrderPlant;

fn main() -> ExitCode {
    let _guard = telemetry::init_tracing("multipid");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("check");
    let path = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(config::default_config_path);

    match command {
        "check" => cmd_check(),
        "run" => cmd_run(path),
        "init" => cmd_init(path),
        "help" | "-h" | "--help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        other => {
            println!("{}: unknown command `{}`", "Error".red(), other);
            print_usage();
            ExitCode::from(2)
        }
    }
}

fn cmd_check() -> ExitCode {
    println!("  Performing checks …");
    let mut failed = 0;
    for outcome in check::run_all() {
        if outcome.passed {
            println!("    {} {}", "✓".green().bold(), outcome.name);
        } else {
            failed += 1;
            println!("    {} {}: {}", "✗".red().bold(), outcome.name, outcome.detail);
        }
    }
    if failed == 0 {
        println!("  {}", "No errors found.".green());
        ExitCode::SUCCESS
    } else {
        println!("  {}", format!("{} check(s) failed.", failed).red().bold());
        ExitCode::FAILURE
    }
}

fn cmd_run(path: PathBuf) -> ExitCode {
    let cfg = match config::load_from(&path) {
        Ok(Some(cfg)) => {
            println!("  Config loaded from {}", path.display().to_string().bold());
            cfg
        }
        Ok(None) => {
            println!(
                "  No config at {}; using defaults.",
                path.display().to_string().dimmed()
            );
            let mut cfg = config::SimulationConfig::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; the simulation cannot be interrupted cleanly");
    }

    let mut plant = FirstOrderPlant::new(cfg.initial_state(), cfg.time_constant);
    match simulation::run(&cfg, &mut plant, &shutdown) {
        Ok(summary) => {
            if summary.interrupted {
                println!("  {}", "⚠  Interrupted – stopping early.".yellow().bold());
            }
            println!("  Steps run:     {}", summary.steps_run);
            println!("  Set point:     {:?}", cfg.set_point);
            println!("  Final value:   {:?}", summary.final_value);
            println!("  Final error:   {:?}", summary.final_error);
            println!("  Last output:   {:?}", summary.last_output);
            println!(
                "  Max |error|:   {}",
                format!("{:.6}", summary.max_abs_error()).bold()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}: {}", "Simulation error".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_init(path: PathBuf) -> ExitCode {
    if path.exists() {
        println!(
            "{}: {} already exists; not overwriting.",
            "Error".red(),
            path.display()
        );
        return ExitCode::FAILURE;
    }
    match config::save_to(&config::SimulationConfig::default(), &path) {
        Ok(()) => {
            println!(
                "  {} Config saved to {}",
                "✓".green().bold(),
                path.display().to_string().bold()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}: {}", "Error saving config".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    println!();
    println!("  {} {}", "multipid".bold(), format!("v{}", env!("CARGO_PKG_VERSION")).dimmed());
    println!();
    println!("  Usage:");
    println!("    multipid check            run the built-in numeric checks");
    println!("    multipid run  [CONFIG]    closed-loop simulation (default ./multipid.toml)");
    println!("    multipid init [CONFIG]    write the default configuration");
    println!();
}
