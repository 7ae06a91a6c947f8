//! flexquant entry point — CLI wiring and config-driven extraction.

use std::path::Path;
use std::process;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flexquant::config::ScenarioConfig;
use flexquant::io::export::export_all;
use flexquant::plan::PlanSource;
use flexquant::runner::{FlexSummary, device_fleet, extract_fleet};
use flexquant::synth::build_plan_set;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    reoptimized: bool,
    flex_out: Option<String>,
    print_tables: bool,
}

fn print_help() {
    eprintln!("flexquant — flexibility extraction and pricing for DER dispatch schedules");
    eprintln!();
    eprintln!("Usage: flexquant [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>   Load scenario from TOML config file");
    eprintln!("  --preset <name>     Use a built-in preset (baseline, all_devices, winter)");
    eprintln!("  --seed <u64>        Override random seed");
    eprintln!("  --reoptimized       Extract from the re-optimized solve instead of the initial one");
    eprintln!("  --flex-out <dir>    Export per-device flexibility tables as CSV");
    eprintln!("  --tables            Print full per-step tables, not just the summary");
    eprintln!("  --help              Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        reoptimized: false,
        flex_out: None,
        print_tables: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--reoptimized" => {
                cli.reoptimized = true;
            }
            "--flex-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --flex-out requires a directory argument");
                    process::exit(1);
                }
                cli.flex_out = Some(args[i].clone());
            }
            "--tables" => {
                cli.print_tables = true;
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    init_tracing();
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then baseline default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    // Apply seed override
    if let Some(seed) = cli.seed_override {
        scenario.scenario.seed = seed;
    }

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Bind the dispatch plans and run the extraction
    let plans = match build_plan_set(&scenario) {
        Ok(plans) => plans,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };
    let source = if cli.reoptimized {
        PlanSource::Reoptimized
    } else {
        PlanSource::Initial
    };
    let fleet = device_fleet(&scenario);
    let tables = match extract_fleet(&fleet, &plans, source) {
        Ok(tables) => tables,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    if cli.print_tables {
        for table in &tables {
            println!("{table}");
        }
    }

    println!("{}", FlexSummary::from_tables(&tables));

    // Export CSVs if requested
    if let Some(ref dir) = cli.flex_out {
        if let Err(e) = export_all(&tables, Path::new(dir)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Flexibility tables written to {dir}");
    }
}
