//! stock-rebalancer CLI
//!
//! Run inventory rebalancing over per-location stock exports.
//!
//! # Usage
//!
//! ```bash
//! # Rebalance every stock export in a directory and write the results
//! stock-rebalancer run --input exports/ --output results/
//!
//! # Print the recommendations as JSON without writing anything
//! stock-rebalancer analyze --input stock_all.xlsx --format json
//!
//! # Generate a random snapshot for testing
//! stock-rebalancer generate --locations 6 --products 500 --output stock_test.csv
//! ```

use serde::Serialize;
use std::fs;
use std::process;
use stock_rebalancer::core::config::RebalanceConfig;
use stock_rebalancer::core::stock_row::StockSnapshot;
use stock_rebalancer::io::loader::{LoadReport, StockLoader};
use stock_rebalancer::io::writer::{write_snapshot_csv, ResultWriter, RunReport};
use stock_rebalancer::optimization::pipeline::{RebalanceEngine, RebalanceResult};
use stock_rebalancer::optimization::summary::LocationSummary;
use stock_rebalancer::simulation::snapshot_generator::{generate_snapshot, SnapshotConfig};

fn print_usage() {
    eprintln!(
        r#"stock-rebalancer: multi-location inventory rebalancing

USAGE:
    stock-rebalancer <COMMAND> [OPTIONS]

COMMANDS:
    run         Load stock exports, compute transfers and write result files
    analyze     Load stock exports and print the result without writing
    generate    Generate a random stock snapshot as CSV (for testing)
    help        Show this message

OPTIONS (run, analyze):
    --input <PATH>        Stock export file (.csv, .xlsx, .xls) or directory of exports
    --output <DIR>        Directory for result files (run only, required)
    --source-floor <N>    Units a donor location always keeps (default: 1)
    --config <FILE>       JSON configuration file
    --format <FORMAT>     Output format: text (default) or json

OPTIONS (generate):
    --locations <N>       Number of locations (default: 5)
    --products <N>        Number of products (default: 100)
    --seed <N>            Seed for reproducible output
    --output <FILE>       Write to file instead of stdout

ENVIRONMENT:
    RUST_LOG              Log filter (default: info)

EXAMPLES:
    stock-rebalancer run --input exports/ --output results/
    stock-rebalancer run --input stock.csv --output results/ --source-floor 2
    stock-rebalancer analyze --input exports/ --format json
    stock-rebalancer generate --locations 8 --products 1000 --seed 42 --output stock_test.csv"#
    );
}

/// Options shared by `run` and `analyze`.
struct RunOptions {
    input: String,
    output: Option<String>,
    config: RebalanceConfig,
    format: String,
}

fn parse_run_options(args: &[String]) -> RunOptions {
    let mut input = None;
    let mut output = None;
    let mut config_path = None;
    let mut source_floor: Option<u64> = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a path");
                    process::exit(1);
                }));
            }
            "--output" => {
                i += 1;
                output = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a directory");
                    process::exit(1);
                }));
            }
            "--config" => {
                i += 1;
                config_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--config requires a file path");
                    process::exit(1);
                }));
            }
            "--source-floor" => {
                i += 1;
                source_floor = Some(
                    args.get(i)
                        .and_then(|s| s.parse().ok())
                        .unwrap_or_else(|| {
                            eprintln!("--source-floor requires a non-negative number");
                            process::exit(1);
                        }),
                );
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    if format != "text" && format != "json" {
        eprintln!("Unknown format '{}': expected 'text' or 'json'", format);
        process::exit(1);
    }

    let input = input.unwrap_or_else(|| {
        eprintln!("Error: --input <PATH> is required");
        process::exit(1);
    });

    let mut config = match config_path {
        Some(path) => RebalanceConfig::from_json_file(&path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        }),
        None => RebalanceConfig::default(),
    };
    if let Some(floor) = source_floor {
        config.source_floor = floor;
    }

    RunOptions {
        input,
        output,
        config,
        format,
    }
}

fn load_and_run(options: &RunOptions) -> (StockSnapshot, RebalanceResult, LoadReport) {
    let loader = StockLoader::new(&options.config);
    let (snapshot, report) = loader.load(&options.input).unwrap_or_else(|e| {
        eprintln!("Error loading '{}': {}", options.input, e);
        process::exit(1);
    });
    for issue in &report.issues {
        eprintln!("Skipped {}: {}", issue.path.display(), issue.reason);
    }

    let engine = RebalanceEngine::new(options.config.clone());
    let result = engine.run(&snapshot).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    (snapshot, result, report)
}

fn print_json<T: Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing output: {}", e);
        process::exit(1);
    });
    println!("{}", json);
}

/// JSON output schema for `analyze`.
#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    units_recommended: u64,
    candidate_need: u64,
    coverage_percent: f64,
    recommendations: Vec<RecommendationOutput<'a>>,
    summary: &'a [LocationSummary],
}

#[derive(Serialize)]
struct RecommendationOutput<'a> {
    product_id: &'a str,
    label: &'a str,
    source: &'a str,
    destination: &'a str,
    quantity: u64,
}

fn cmd_run(args: &[String]) {
    let options = parse_run_options(args);
    let output_dir = options.output.clone().unwrap_or_else(|| {
        eprintln!("Error: --output <DIR> is required");
        process::exit(1);
    });

    let (snapshot, result, report) = load_and_run(&options);

    let writer = ResultWriter::new(&output_dir).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    let mut written = writer.write_all(&result, Some(&report)).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    written.push(
        writer
            .write_snapshot(&snapshot, &options.config.columns)
            .unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                process::exit(1);
            }),
    );

    if options.format == "json" {
        print_json(&RunReport::new(&result, Some(&report)));
    } else {
        println!("{}", result);
        println!("Files written to {}:", writer.dir().display());
        for path in written {
            println!("  {}", path.display());
        }
    }
}

fn cmd_analyze(args: &[String]) {
    let options = parse_run_options(args);
    if options.output.is_some() {
        eprintln!("Unknown option for analyze: --output (use 'run' to write files)");
        process::exit(1);
    }

    let (_, result, _) = load_and_run(&options);

    if options.format == "json" {
        let output = AnalyzeOutput {
            units_recommended: result.units_recommended(),
            candidate_need: result.candidate_need(),
            coverage_percent: result.coverage_percent(),
            recommendations: result
                .recommendations()
                .iter()
                .map(|r| RecommendationOutput {
                    product_id: r.product_id().as_str(),
                    label: r.label(),
                    source: r.source().as_str(),
                    destination: r.destination().as_str(),
                    quantity: r.quantity(),
                })
                .collect(),
            summary: result.summaries(),
        };
        print_json(&output);
    } else {
        println!("{}", result);

        if !result.recommendations().is_empty() {
            println!("--- Recommendations ---");
            for rec in result.recommendations() {
                println!("  {}", rec);
            }
        }
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = SnapshotConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--locations" => {
                i += 1;
                config.location_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--locations requires a number");
                        process::exit(1);
                    });
            }
            "--products" => {
                i += 1;
                config.product_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--products requires a number");
                        process::exit(1);
                    });
            }
            "--seed" => {
                i += 1;
                config.seed = Some(args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--seed requires a number");
                    process::exit(1);
                }));
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let snapshot = generate_snapshot(&config);
    let columns = RebalanceConfig::default().columns;

    if let Some(path) = output_path {
        let file = fs::File::create(&path).unwrap_or_else(|e| {
            eprintln!("Error creating '{}': {}", path, e);
            process::exit(1);
        });
        write_snapshot_csv(&snapshot, &columns, file).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} rows across {} locations → {}",
            snapshot.len(),
            config.location_count,
            path
        );
    } else {
        write_snapshot_csv(&snapshot, &columns, std::io::stdout()).unwrap_or_else(|e| {
            eprintln!("Error writing CSV: {}", e);
            process::exit(1);
        });
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "run" => cmd_run(rest),
        "analyze" => cmd_analyze(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
