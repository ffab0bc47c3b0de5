// Shop Floor Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/shop-floor-simulator --seed 7
// ```
//
// Or with a shop floor description and custom weights:
//
// ```console
// $ ./target/release/shop-floor-simulator --shop-floor floor.json --weight-cost 0.25 \
//       --weight-performance 0.25 --weight-equity 0.25 --weight-makespan 0.25 --verbose
// ```

use anyhow::{Context, Result};
use clap::Parser;
use shop_floor_simulator::shop::{ScenarioGenerator, ShopFloor, ShopFloorConfig};
use shop_floor_simulator::simulation::{
    JsonLinesSink, LoggingConfig, RunReport, SimulationOrchestrator, SliceReport,
};
use shop_floor_simulator::types::config::CliArgs;
use shop_floor_simulator::types::SimulationConfig;
use std::fs;
use std::process;
use tracing::{error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    // Handle special CLI flags that don't require full initialization
    if args.print_config {
        match SimulationConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    // The guard must outlive the run so buffered file logs are flushed
    let _log_guard = match LoggingConfig::from_verbosity(args.verbose, args.debug).init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    info!("Starting Shop Floor Simulator");

    if let Err(e) = run(args) {
        error!("Simulation failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }

    info!("Shop Floor Simulator completed successfully");
}

/// Load, validate and run one simulation
fn run(args: CliArgs) -> Result<()> {
    let shop_floor_path = args.shop_floor.clone();
    let dry_run = args.dry_run;

    let (config, embedded) =
        SimulationConfig::from_cli_args(args).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;
    info!("Configuration loaded and validated successfully");

    let shop_floor = load_shop_floor(&config, shop_floor_path.as_deref(), embedded)?;

    if dry_run {
        let floor = ShopFloor::from_config(shop_floor).context("Shop floor validation failed")?;
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - simulation will not be executed.");
        print_configuration_summary(&config, &floor);
        return Ok(());
    }

    print_startup_banner(&config);

    let mut orchestrator = SimulationOrchestrator::new(config.clone(), shop_floor)
        .context("Failed to initialize simulation")?;
    if let Some(path) = &config.events_output {
        let sink = JsonLinesSink::create(path)
            .with_context(|| format!("Failed to create events output '{}'", path))?;
        orchestrator = orchestrator.with_sink(Box::new(sink));
        eprintln!("Writing run records to {}", path);
    }

    let report = orchestrator
        .run_with_progress(print_slice_progress)
        .context("Simulation aborted")?;

    eprintln!();
    eprintln!("{}", report.statistics);
    write_report(&report, config.report_output.as_deref())
}

/// Pick the shop floor: `--shop-floor` file, then the configuration file's
/// embedded section, then a generated scenario
fn load_shop_floor(
    config: &SimulationConfig,
    path: Option<&str>,
    embedded: Option<ShopFloorConfig>,
) -> Result<ShopFloorConfig> {
    if let Some(path) = path {
        info!("Loading shop floor from {}", path);
        return ShopFloorConfig::from_file(path)
            .with_context(|| format!("Failed to load shop floor '{}'", path));
    }
    if let Some(shop_floor) = embedded {
        info!("Using shop floor embedded in the configuration file");
        return Ok(shop_floor);
    }

    eprintln!("Generating shop floor scenario...");
    let shop_floor = ScenarioGenerator::from_config(config).generate(config);
    info!(
        "Generated {} operators, {} machines, {} products, {} tasks",
        shop_floor.operators.len(),
        shop_floor.machines.len(),
        shop_floor.products.len(),
        shop_floor.tasks.len()
    );
    Ok(shop_floor)
}

/// Write the JSON run report to a file, or to stdout when no path is set
fn write_report(report: &RunReport, path: Option<&str>) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    match path {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write report '{}'", path))?;
            eprintln!("Run report written to {}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn print_slice_progress(slice: &SliceReport) {
    eprintln!(
        "  [{:>8.1} - {:>8.1}] {:>4} events, {:>3} errored, clock {:>8.2}, {}",
        slice.slice_start,
        slice.slice_end,
        slice.processed.len(),
        slice.errored_count(),
        slice.clock,
        slice.state
    );
}

/// Print startup banner
fn print_startup_banner(config: &SimulationConfig) {
    eprintln!("Shop Floor Simulator");
    eprintln!("====================");
    eprintln!("Discrete-event dispatching of learning operators to machine tasks");
    eprintln!();
    eprintln!("Configuration:");
    eprintln!("  Horizon: {} min", config.horizon_minutes);
    eprintln!("  Slice: {} min", config.slice_minutes);
    eprintln!(
        "  Weights: cost {:.2}, performance {:.2}, equity {:.2}, makespan {:.2}",
        config.weights.cost,
        config.weights.performance,
        config.weights.equity,
        config.weights.makespan
    );
    eprintln!("  Default Performance: {:.2}", config.default_performance);
    if let Some(seed) = config.seed {
        eprintln!("  Random Seed: {}", seed);
    }
    eprintln!();
}

/// Print configuration summary with the validated shop floor
fn print_configuration_summary(config: &SimulationConfig, floor: &ShopFloor) {
    print_startup_banner(config);
    eprintln!("Shop Floor:");
    eprintln!("  Operators: {}", floor.operators().len());
    eprintln!("  Machines: {}", floor.machines().len());
    eprintln!("  Products: {}", floor.products().len());
    eprintln!("  Tasks: {} ({} units)", floor.tasks().len(), floor.total_units());
    eprintln!();
}
