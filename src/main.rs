//! tula-bench binary - evaluate registration algorithms from a config file.
//!
//! Reads a JSON configuration naming the algorithms, dataset loader, and
//! metrics to run, evaluates every (algorithm, sample) pair on a worker
//! pool, and writes one `<algorithm>_result.csv` per algorithm.
//!
//! # Usage
//!
//! ```bash
//! # With the default config.json in the working directory
//! tula-bench
//!
//! # Explicit config, worker count, and output directory
//! tula-bench --config bench.json --threads 8 --output results/
//! ```
//!
//! # Configuration
//!
//! ```json
//! {
//!   "algorithms": [{ "name": "icp", "max_iterations": 50 }],
//!   "metrics": [
//!     { "name": "translation_error", "rms": true },
//!     { "name": "rotation_error", "degrees": true }
//!   ],
//!   "dataset_loader": { "name": "3dmatch", "root": "datasets/3dmatch" },
//!   "threads": 0,
//!   "output_dir": "results"
//! }
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Deserialize;
use serde_json::Value;

use tula_bench::engine::ProgressFn;
use tula_bench::{algorithms, dataset, metrics, report};
use tula_bench::{Error, EvaluationRunner, Result};

#[derive(Parser)]
#[command(name = "tula-bench")]
#[command(about = "Benchmark point-cloud registration algorithms")]
struct Args {
    /// Path to the benchmark configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Worker thread count override (0 = available hardware parallelism)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Output directory override for per-algorithm CSV results
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Top-level benchmark configuration.
#[derive(Debug, Deserialize)]
struct BenchConfig {
    /// Algorithm capability configs, each with a string `name`
    algorithms: Vec<Value>,
    /// Metric capability configs, each with a string `name`
    metrics: Vec<Value>,
    /// Dataset loader capability config with a string `name`
    dataset_loader: Value,
    /// Worker count hint (0 = available hardware parallelism)
    #[serde(default)]
    threads: usize,
    /// Directory for per-algorithm CSV results
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn capability_name<'a>(config: &'a Value, kind: &str) -> Result<&'a str> {
    config
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Config(format!("each {kind} config must have a string 'name'")))
}

fn print_progress(completed: usize, total: usize) {
    let percent = if total == 0 {
        100.0
    } else {
        100.0 * completed as f64 / total as f64
    };
    print!("\rProgress: {percent:6.2}% ({completed}/{total})");
    let _ = io::stdout().flush();
    if completed >= total {
        println!();
    }
}

fn run(args: &Args) -> Result<()> {
    let contents = fs::read_to_string(&args.config)
        .map_err(|e| Error::Config(format!("could not read {}: {e}", args.config.display())))?;
    let config: BenchConfig = serde_json::from_str(&contents)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", args.config.display())))?;

    let algorithm_registry = algorithms::builtin_registry();
    let loader_registry = dataset::builtin_registry();
    let metric_registry = metrics::builtin_registry();

    let mut algorithm_handles = Vec::with_capacity(config.algorithms.len());
    for algorithm_config in &config.algorithms {
        let name = capability_name(algorithm_config, "algorithm")?;
        algorithm_handles.push(algorithm_registry.create(name, algorithm_config)?);
    }

    let mut metric_handles = Vec::with_capacity(config.metrics.len());
    for metric_config in &config.metrics {
        let name = capability_name(metric_config, "metric")?;
        metric_handles.push(metric_registry.create(name, metric_config)?);
    }

    let loader_name = capability_name(&config.dataset_loader, "dataset loader")?;
    let loader = loader_registry.create(loader_name, &config.dataset_loader)?;

    let samples = loader.load_samples()?;
    log::info!(
        "Loaded {} sample(s) from dataset '{}'",
        samples.len(),
        loader.name()
    );

    let worker_hint = args.threads.unwrap_or(config.threads);
    let runner = EvaluationRunner::new(worker_hint);

    let progress_sink: &ProgressFn = &print_progress;
    let results = runner.run(
        &algorithm_handles,
        &samples,
        &metric_handles,
        Some(progress_sink),
    );

    let metric_names: Vec<String> = metric_handles
        .iter()
        .map(|metric| metric.name().to_string())
        .collect();
    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| config.output_dir.clone());
    fs::create_dir_all(&output_dir)?;
    report::write_results_to_csv(&results, &metric_names, &output_dir);

    Ok(())
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let args = Args::parse();

    log::info!("tula-bench starting");
    log::info!("  Config: {}", args.config.display());

    match run(&args) {
        Ok(()) => {
            log::info!("tula-bench complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
