//! Result aggregation and CSV reporting.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Per-sample score vector, one entry per metric in configured order.
///
/// An empty row marks a failed task; the row keeps its index so tabular
/// output stays aligned with the sample list.
pub type ScoreRow = Vec<f64>;

/// Finalized evaluation results: algorithm name → score rows aligned with
/// the sample list.
///
/// Backed by a `BTreeMap` so iteration (and therefore serialization) is
/// deterministic and independent of scheduling order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlgorithmResults {
    results: BTreeMap<String, Vec<ScoreRow>>,
}

impl AlgorithmResults {
    /// Create an empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an algorithm's rows. Re-inserting a name replaces its rows.
    pub fn insert(&mut self, algorithm_name: String, rows: Vec<ScoreRow>) {
        self.results.insert(algorithm_name, rows);
    }

    /// Rows for one algorithm.
    pub fn get(&self, algorithm_name: &str) -> Option<&Vec<ScoreRow>> {
        self.results.get(algorithm_name)
    }

    /// Number of algorithms.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether any algorithm has results.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterate algorithms in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<ScoreRow>)> {
        self.results.iter()
    }
}

/// Write one table: metric-name header, then one line per score row.
///
/// Failed (empty) rows produce blank lines so row N always corresponds to
/// sample N.
pub fn write_csv_table<W: Write>(
    writer: &mut W,
    metric_names: &[String],
    rows: &[ScoreRow],
) -> io::Result<()> {
    writeln!(writer, "{}", metric_names.join(","))?;
    for row in rows {
        let line: Vec<String> = row.iter().map(|value| value.to_string()).collect();
        writeln!(writer, "{}", line.join(","))?;
    }
    Ok(())
}

/// Write `<algorithm>_result.csv` into `output_dir` for every algorithm.
///
/// A failure writing one algorithm's file is logged and does not block the
/// remaining algorithms.
pub fn write_results_to_csv(
    results: &AlgorithmResults,
    metric_names: &[String],
    output_dir: &Path,
) {
    for (algorithm_name, rows) in results.iter() {
        let path = output_dir.join(format!("{algorithm_name}_result.csv"));
        log::info!(
            "Writing results for algorithm '{algorithm_name}' to {}",
            path.display()
        );

        let file = match File::create(&path) {
            Ok(file) => file,
            Err(e) => {
                log::error!("Failed to open result file for algorithm '{algorithm_name}': {e}");
                continue;
            }
        };

        let mut writer = BufWriter::new(file);
        if let Err(e) = write_csv_table(&mut writer, metric_names, rows) {
            log::error!("Failed to write results for algorithm '{algorithm_name}': {e}");
        }
    }
}
