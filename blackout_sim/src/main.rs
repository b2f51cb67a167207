//! Blackout Simulator CLI
//!
//! Runs the built-in scenarios, or a world loaded from JSON.

use blackout_sim::{ScenarioId, ScenarioResult, ScenarioRunner, SimConfig, SimExport, WorldDefinition};
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Blackout file-transfer simulator
#[derive(Parser, Debug)]
#[command(name = "blackout-sim")]
#[command(about = "Simulate file transfers between devices and satellites around Jupiter", long_about = None)]
struct Args {
    /// Scenario to run (shared_link, standard_storage, teleport_loss, relay_chain, slope_walk, link_break, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Ticks to run a world for when it does not set its own
    #[arg(short, long, default_value = "100")]
    ticks: u64,

    /// Run the world described by this JSON file instead of a scenario
    #[arg(short, long)]
    world: Option<String>,

    /// Export frames of a single run to this JSON file
    #[arg(long)]
    export: Option<String>,

    /// Export a frame every this many ticks
    #[arg(long, default_value = "1")]
    export_interval: u64,

    /// Abort a world run on the first rejected send
    #[arg(long)]
    strict: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ExitCode::FAILURE;
    }

    if !args.json {
        info!("Blackout Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let runner = ScenarioRunner::new().with_config(SimConfig {
        ticks: args.ticks,
        export_interval: args.export_interval,
        strict_sends: args.strict,
    });

    let results = match &args.world {
        Some(path) => match run_world(&runner, path, args.export.as_deref()) {
            Ok(result) => vec![result],
            Err(e) => {
                error!("Failed to run world {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => {
            let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
                ScenarioId::all()
            } else {
                match args.scenario.parse() {
                    Ok(scenario) => vec![scenario],
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        eprintln!("Available scenarios: {}, all", scenario_names());
                        return ExitCode::FAILURE;
                    }
                }
            };

            if args.export.is_some() && scenarios.len() > 1 {
                eprintln!("Error: --export only supports a single scenario, not 'all'");
                return ExitCode::FAILURE;
            }

            scenarios
                .into_iter()
                .map(|scenario| match &args.export {
                    Some(path) => {
                        let mut export = SimExport::new(scenario.name());
                        let result = runner.run_with_export(scenario, &mut export);
                        write_export(&export, path);
                        result
                    }
                    None => runner.run(scenario),
                })
                .collect()
        }
    };

    let failed_count = results.iter().filter(|r| !r.passed).count();

    if args.json {
        print_json(&results, failed_count);
    } else {
        report(&results, failed_count);
    }

    if failed_count > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run_world(
    runner: &ScenarioRunner,
    path: &str,
    export_path: Option<&str>,
) -> Result<ScenarioResult, blackout_sim::ConfigError> {
    let definition = WorldDefinition::load(path)?;
    match export_path {
        Some(export_path) => {
            let mut export = SimExport::new(path);
            let result = runner.run_world(path, &definition, Some(&mut export))?;
            write_export(&export, export_path);
            Ok(result)
        }
        None => runner.run_world(path, &definition, None),
    }
}

fn write_export(export: &SimExport, path: &str) {
    if let Err(e) = export.write_to_file(path) {
        error!("Failed to write export: {:?}", e);
    } else {
        info!("Exported {} frames to {}", export.frames.len(), path);
    }
}

fn scenario_names() -> String {
    ScenarioId::all()
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_json(results: &[ScenarioResult], failed_count: usize) {
    let summary = serde_json::json!({
        "total": results.len(),
        "passed": results.len() - failed_count,
        "failed": failed_count,
        "results": results.iter().map(|r| {
            serde_json::json!({
                "scenario": r.scenario,
                "passed": r.passed,
                "ticks": r.total_ticks,
                "sends_admitted": r.metrics.sends_admitted,
                "sends_rejected": r.metrics.sends_rejected,
                "completed": r.metrics.transfers_completed,
                "aborted": r.metrics.transfers_aborted,
                "corrupted": r.metrics.teleport_corruptions,
                "failure_reason": r.failure_reason,
            })
        }).collect::<Vec<_>>(),
    });

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to encode summary: {}", e),
    }
}

fn report(results: &[ScenarioResult], failed_count: usize) {
    for result in results {
        if result.passed {
            info!(
                "✓ {} PASSED ({} ticks, {} completed, {} aborted)",
                result.scenario,
                result.total_ticks,
                result.metrics.transfers_completed,
                result.metrics.transfers_aborted
            );
        } else {
            error!(
                "✗ {} FAILED: {}",
                result.scenario,
                result.failure_reason.as_deref().unwrap_or("unknown")
            );
        }
    }

    info!("");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if failed_count == 0 {
        info!("✅ All {} runs passed!", results.len());
    } else {
        error!("❌ {}/{} runs failed!", failed_count, results.len());
    }
}
