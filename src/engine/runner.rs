//! Concurrent evaluation runner.
//!
//! Executes the full algorithm × sample cross product, one task per pair,
//! on a bounded pool of worker threads:
//!
//! - Tasks are independent; completion order is arbitrary, but result
//!   placement is not: `results[algorithm][sample_index]` always holds the
//!   score row for that pair.
//! - A failing task is logged and leaves an empty score row at its index;
//!   sibling tasks are unaffected and nothing is retried.
//! - Progress advances by exactly one unit per task, success or failure
//!   alike.
//! - The submitting thread blocks until every task has finished, then hands
//!   the gathered results back.

use std::thread;

use crossbeam_channel::unbounded;

use crate::algorithms::Algorithm;
use crate::core::types::{Sample, Transform};
use crate::engine::progress::{Progress, ProgressFn};
use crate::engine::trajectory::estimate_trajectory;
use crate::error::Result;
use crate::metrics::Metric;
use crate::report::{AlgorithmResults, ScoreRow};

/// Score one estimated trajectory with every metric, in metric order.
pub fn evaluate_sample(
    metrics: &[Box<dyn Metric>],
    estimated: &[Transform],
    ground_truth: &[Transform],
) -> Result<ScoreRow> {
    let mut scores = Vec::with_capacity(metrics.len());
    for metric in metrics {
        scores.push(metric.evaluate(estimated, ground_truth)?);
    }
    Ok(scores)
}

fn run_task(
    algorithm: &dyn Algorithm,
    sample: &Sample,
    metrics: &[Box<dyn Metric>],
) -> Result<ScoreRow> {
    let estimated = estimate_trajectory(algorithm, sample.point_clouds())?;
    evaluate_sample(metrics, &estimated, sample.world_transforms())
}

/// Bounded-pool evaluation runner.
pub struct EvaluationRunner {
    worker_count: usize,
}

impl EvaluationRunner {
    /// Create a runner.
    ///
    /// A hint of 0 uses the available hardware parallelism, minimum 1.
    pub fn new(worker_count_hint: usize) -> Self {
        let worker_count = if worker_count_hint > 0 {
            worker_count_hint
        } else {
            thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1)
        };
        Self { worker_count }
    }

    /// Resolved worker count.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Evaluate every algorithm on every sample.
    ///
    /// Returns algorithm name → score rows aligned with the sample list.
    /// Empty algorithm or sample lists schedule nothing and return an empty
    /// mapping, with progress reported complete immediately.
    pub fn run(
        &self,
        algorithms: &[Box<dyn Algorithm>],
        samples: &[Sample],
        metrics: &[Box<dyn Metric>],
        on_progress: Option<&ProgressFn>,
    ) -> AlgorithmResults {
        let mut results = AlgorithmResults::new();

        if algorithms.is_empty() || samples.is_empty() {
            if let Some(callback) = on_progress {
                callback(0, 0);
            }
            return results;
        }

        let total = algorithms.len() * samples.len();
        let progress = Progress::new(total);

        log::info!(
            "Starting evaluation with {} worker(s), {} algorithm(s) and {} sample(s)",
            self.worker_count,
            algorithms.len(),
            samples.len()
        );

        let (task_tx, task_rx) = unbounded::<(usize, usize)>();
        for algo_idx in 0..algorithms.len() {
            for sample_idx in 0..samples.len() {
                // Send on an unbounded channel with a live receiver cannot fail
                let _ = task_tx.send((algo_idx, sample_idx));
            }
        }
        drop(task_tx);

        // Rows pre-sized per algorithm; each task fills a distinct slot
        let mut rows: Vec<Vec<ScoreRow>> = vec![vec![ScoreRow::new(); samples.len()]; algorithms.len()];

        let (result_tx, result_rx) = unbounded::<(usize, usize, ScoreRow)>();
        let progress_ref = &progress;

        thread::scope(|scope| {
            for worker_idx in 0..self.worker_count {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();

                thread::Builder::new()
                    .name(format!("eval-{worker_idx}"))
                    .spawn_scoped(scope, move || {
                        while let Ok((algo_idx, sample_idx)) = task_rx.recv() {
                            let algorithm = algorithms[algo_idx].as_ref();
                            let row = match run_task(algorithm, &samples[sample_idx], metrics) {
                                Ok(row) => row,
                                Err(e) => {
                                    log::error!(
                                        "Error processing sample index {} with algorithm '{}': {}",
                                        sample_idx,
                                        algorithm.name(),
                                        e
                                    );
                                    ScoreRow::new()
                                }
                            };

                            let completed = progress_ref.record();
                            if let Some(callback) = on_progress {
                                callback(completed, total);
                            }

                            let _ = result_tx.send((algo_idx, sample_idx, row));
                        }
                    })
                    .expect("Failed to spawn evaluation worker");
            }
            drop(result_tx);

            // Gather on the submitting thread; ends when all workers are done
            for (algo_idx, sample_idx, row) in result_rx.iter() {
                rows[algo_idx][sample_idx] = row;
            }
        });

        for (algorithm, algorithm_rows) in algorithms.iter().zip(rows) {
            results.insert(algorithm.name().to_string(), algorithm_rows);
        }

        log::info!("Evaluation complete ({total} task(s))");
        results
    }
}
