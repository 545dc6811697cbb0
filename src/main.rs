//! Map benchmark suite.
//!
//! Compares container implementations across every catalog operation, key
//! distribution, and size, printing one table per workload.
//!
//! Run with: cargo run --release -- --impl std --impl hashbrown

use clap::Parser;
use mapbench::{
    report,
    suite::{Suite, SuiteConfig, COLLISION_SIZES, SIZES},
    Analyzer, AnalyzerConfig, Harness, HarnessConfig, KeyType,
};
use std::{path::PathBuf, process::ExitCode};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mapbench")]
#[command(about = "Micro-benchmarks for associative container implementations")]
#[command(version)]
struct Args {
    /// Implementations to compare (std, hashbrown, btree, linear)
    #[arg(short, long = "impl", default_values_t = ["std".to_string(), "hashbrown".to_string()])]
    implementations: Vec<String>,

    /// Key distributions to sweep (sequential, random_ints, random_strings)
    #[arg(short, long = "key-type")]
    key_types: Vec<String>,

    /// Workload sizes
    #[arg(short, long, value_delimiter = ',', default_values_t = SIZES)]
    sizes: Vec<usize>,

    /// Recorded trials per cell
    #[arg(short = 'n', long, default_value_t = mapbench::harness::ITERATIONS)]
    iterations: usize,

    /// Unrecorded trials run before the recorded ones
    #[arg(short, long, default_value_t = mapbench::harness::WARMUP_ITERATIONS)]
    warmup: usize,

    /// Seed for random workloads (entropy when absent)
    #[arg(long)]
    seed: Option<u64>,

    /// Ratio a runner-up must exceed for the winner to count as faster
    #[arg(short, long, default_value_t = mapbench::analyzer::NOISE_THRESHOLD)]
    threshold: f64,

    /// Also sweep colliding keys (constant and coarse-bucket hashes)
    #[arg(long)]
    collisions: bool,

    /// Sizes for collision workloads
    #[arg(long, value_delimiter = ',', default_values_t = COLLISION_SIZES)]
    collision_sizes: Vec<usize>,

    /// Write flat `name: microseconds` results to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let key_types = if args.key_types.is_empty() {
        KeyType::ALL.to_vec()
    } else {
        match args
            .key_types
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<KeyType>, _>>()
        {
            Ok(key_types) => key_types,
            Err(err) => {
                error!(%err, "invalid key type");
                return ExitCode::FAILURE;
            }
        }
    };

    let harness = match Harness::new(HarnessConfig {
        iterations: args.iterations,
        warmup: args.warmup,
        keep_raw: false,
    }) {
        Ok(harness) => harness,
        Err(err) => {
            error!(%err, "invalid harness configuration");
            return ExitCode::FAILURE;
        }
    };
    let analyzer = Analyzer::new(
        harness,
        AnalyzerConfig {
            threshold: args.threshold,
        },
    );

    let mut config = SuiteConfig {
        implementations: args.implementations,
        key_types,
        sizes: args.sizes,
        seed: args.seed,
        collision_sizes: args.collision_sizes,
        ..SuiteConfig::default()
    };
    if args.collisions {
        config = config.with_default_collisions();
    }

    println!();
    println!("{}", report::banner("Map Benchmark Suite"));
    println!(
        "Implementations: {}   Iterations: {} (+ {} warmup)   Platform: {}",
        config.implementations.join(", "),
        args.iterations,
        args.warmup,
        std::env::consts::ARCH
    );
    println!();

    let sections = match Suite::new(&analyzer, config).run(|section| {
        println!("{}", report::render_section(section));
    }) {
        Ok(sections) => sections,
        Err(err) => {
            error!(%err, "cannot run suite");
            return ExitCode::FAILURE;
        }
    };

    println!("{}", report::banner("Benchmark Summary"));
    if let Some(summary) = report::render_extremes(&sections) {
        println!("{summary}");
    }

    if let Some(path) = args.output {
        if let Err(err) = report::write_results(&path, &sections) {
            error!(path = %path.display(), %err, "cannot write results");
            return ExitCode::FAILURE;
        }
        info!(path = %path.display(), "results saved");
    }
    ExitCode::SUCCESS
}
