//! ember-csv: Convert EMBER JSON Lines feature files to CSV
//!
//! Usage:
//!   # Default EMBER header features, writes train_features_0.csv
//!   ember-csv train_features_0.jsonl
//!
//!   # Pick the columns, label is always appended last
//!   ember-csv --features md5,machine,sections_mean_entropy data.jsonl
//!
//!   # Only replace the output once the whole file converted
//!   ember-csv --atomic --config extract.json data.jsonl

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Result};
use clap::Parser;
use ember_csv::extract::LineEnding;
use ember_csv::{logging, ExtractConfig, ExtractError, Extractor, OutputMode};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "ember-csv")]
#[command(about = "Extract EMBER features from JSON Lines into CSV", long_about = None)]
struct Args {
    /// Input JSON Lines files, converted one after another
    #[arg(value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,

    /// JSON config file (features, target, output options)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Comma-separated feature names, overrides the config list
    #[arg(long, short = 'f')]
    features: Option<String>,

    /// Target column written last (default: "label")
    #[arg(long)]
    target: Option<String>,

    /// Output path (single input only). Defaults to the input with a .csv extension
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Maximum nesting depth searched for a feature (default: 64)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Terminate rows with LF instead of CRLF
    #[arg(long)]
    lf: bool,

    /// Replace the output only after the whole input converted
    #[arg(long)]
    atomic: bool,

    /// Log level when RUST_LOG is unset (default: "info")
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn build_config(args: &Args) -> Result<ExtractConfig> {
    let mut config = match &args.config {
        Some(path) => ExtractConfig::load(path)?,
        None => ExtractConfig::default(),
    };

    if let Some(list) = &args.features {
        config.features = ExtractConfig::parse_feature_list(list);
    }
    if let Some(target) = &args.target {
        config.target = target.clone();
    }
    if let Some(depth) = args.max_depth {
        config.max_depth = depth;
    }
    if args.lf {
        config.line_ending = LineEnding::Lf;
    }
    if args.atomic {
        config.output_mode = OutputMode::Atomic;
    }
    if let Some(level) = &args.log_level {
        config.log.level = level.clone();
    }
    if args.json_logs {
        config.log.json = true;
    }

    Ok(config)
}

fn run(args: &Args, config: &ExtractConfig) -> Result<()> {
    if args.output.is_some() && args.inputs.len() > 1 {
        bail!("--output can only be used with a single input file");
    }

    let extractor = Extractor::new(config);
    info!(columns = ?extractor.feature_set().names(), "feature set");

    for input in &args.inputs {
        extractor.convert_file(input, args.output.as_deref())?;
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            std::process::exit(2);
        }
    };
    logging::init(&config.log);

    if let Err(err) = run(&args, &config) {
        match err.downcast_ref::<ExtractError>().and_then(ExtractError::feature) {
            Some(feature) => error!(feature, "{:#}", err),
            None => error!("{:#}", err),
        }
        std::process::exit(1);
    }
}
