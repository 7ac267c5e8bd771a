//! Scenario runner CLI
//!
//! Usage:
//!   kinema-scenarios list                    # List built-in scenarios and components
//!   kinema-scenarios run                     # Run all built-in scenarios
//!   kinema-scenarios run --filter timing     # Run scenarios matching "timing"
//!   kinema-scenarios scenario a.json b.json  # Run scenario files
//!   kinema-scenarios -c kinema.toml run      # Run with a harness config

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use kinema_test_suite::{tests, ComponentRegistry, HarnessConfig, Scenario, TestRunner, TestSuite};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "kinema-scenarios")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run Kinema animation scenarios against a virtual clock", long_about = None)]
struct Cli {
    /// Harness config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in scenarios and registered components
    List,

    /// Run built-in scenarios
    Run {
        /// Only run scenarios whose name or suite contains this pattern
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Run scenario files
    Scenario {
        /// JSON scenario files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let passed = match cli.command {
        Commands::List => {
            cmd_list();
            true
        }
        Commands::Run { filter } => cmd_run(config, filter.as_deref()),
        Commands::Scenario { files } => cmd_scenario(config, &files)?,
    };

    if passed {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

fn cmd_list() {
    println!("Available scenario suites:");
    for suite in tests::all_suites() {
        println!("\n  {}:", suite.name);
        for case in &suite.cases {
            println!("    - {}", case.name);
        }
    }

    println!("\nRegistered components:");
    for name in ComponentRegistry::builtin().names() {
        println!("    - {name}");
    }
}

fn cmd_run(config: HarnessConfig, filter: Option<&str>) -> bool {
    println!("╔══════════════════════════════════════════╗");
    println!("║          KINEMA SCENARIO RUNNER          ║");
    println!("╚══════════════════════════════════════════╝\n");

    let mut runner = TestRunner::with_config(config);
    for suite in tests::all_suites() {
        runner.add_suite(suite);
    }

    if let Some(pattern) = filter {
        println!("Running scenarios matching: {}\n", pattern);
        runner.filter(pattern);
    }

    let result = runner.run();
    result.print_summary();

    if result.all_passed() {
        println!("\nAll scenarios passed!");
    }
    result.all_passed()
}

fn cmd_scenario(config: HarnessConfig, files: &[PathBuf]) -> Result<bool> {
    let registry = ComponentRegistry::builtin();
    let mut suite = TestSuite::new("files");

    for path in files {
        let scenario = load(path)?;
        let registry = registry.clone();
        let name = scenario.display_name().to_string();
        suite.add(&name, move |ctx| scenario.run(ctx, &registry));
    }

    let mut runner = TestRunner::with_config(config);
    runner.add_suite(suite);
    let result = runner.run();
    result.print_summary();
    Ok(result.all_passed())
}

fn load(path: &Path) -> Result<Scenario> {
    let scenario = Scenario::from_path(path)?;
    tracing::info!(
        "Loaded {} ({} step(s)) from {}",
        scenario.display_name(),
        scenario.steps.len(),
        path.display()
    );
    Ok(scenario)
}
