// Plots for the YOLO inference scalability runs:
//   strong scaling: batch size vs execution time, one color per worker count
//   weak scaling:   worker count vs mean execution time, annotated with the workload

use serde::{de, Deserialize, Deserializer};

pub mod aggregate;
pub mod cli;
pub mod dataset;
pub mod error;
pub mod palette;
pub mod render;
pub mod strong;
pub mod weak;

pub use aggregate::{aggregate_by_workers, trend_lines, AggregatedGroup, TrendLine, TrendPoint};
pub use dataset::Dataset;
pub use error::{PlotError, Result};
pub use render::{Chart, RenderOptions};
pub use strong::StrongScalabilityChart;
pub use weak::WeakScalabilityChart;

/// A required CSV column. The alias is the header written by the benchmark harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub alias: Option<&'static str>,
}

impl Column {
    pub fn is_in<'a>(&self, mut headers: impl Iterator<Item = &'a str>) -> bool {
        headers.any(|h| h == self.name || Some(h) == self.alias)
    }
}

pub const EXECUTION_TIME: Column = Column {
    name: "execution_time",
    alias: Some("tempo_execucao_s"),
};

pub const WORKER_COUNT: Column = Column {
    name: "worker_count",
    alias: Some("workers"),
};

pub const BATCH_SIZE: Column = Column {
    name: "batch_size",
    alias: None,
};

pub const IMAGES_TESTED: Column = Column {
    name: "images_tested",
    alias: Some("imagens_testadas"),
};

/// One CSV record of a benchmark run.
pub trait BenchmarkRow: for<'de> Deserialize<'de> {
    const COLUMNS: &'static [Column];

    /// Returns the offending column and the reason when a value is outside its domain.
    fn validate(&self) -> std::result::Result<(), (&'static str, &'static str)>;
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StrongRow {
    #[serde(alias = "tempo_execucao_s")]
    pub execution_time: f64,
    #[serde(alias = "workers", deserialize_with = "integer")]
    pub worker_count: u32,
    #[serde(deserialize_with = "integer")]
    pub batch_size: u32,
}

impl BenchmarkRow for StrongRow {
    const COLUMNS: &'static [Column] = &[EXECUTION_TIME, WORKER_COUNT, BATCH_SIZE];

    fn validate(&self) -> std::result::Result<(), (&'static str, &'static str)> {
        check_time(self.execution_time)?;
        check_workers(self.worker_count)?;
        if self.batch_size == 0 {
            return Err((BATCH_SIZE.name, "batch size must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WeakRow {
    #[serde(alias = "tempo_execucao_s")]
    pub execution_time: f64,
    #[serde(alias = "workers", deserialize_with = "integer")]
    pub worker_count: u32,
    #[serde(alias = "imagens_testadas", deserialize_with = "integer")]
    pub images_tested: u64,
}

impl BenchmarkRow for WeakRow {
    const COLUMNS: &'static [Column] = &[EXECUTION_TIME, WORKER_COUNT, IMAGES_TESTED];

    fn validate(&self) -> std::result::Result<(), (&'static str, &'static str)> {
        check_time(self.execution_time)?;
        check_workers(self.worker_count)
    }
}

fn check_time(seconds: f64) -> std::result::Result<(), (&'static str, &'static str)> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err((EXECUTION_TIME.name, "execution time must be a finite, non-negative number"));
    }
    Ok(())
}

fn check_workers(workers: u32) -> std::result::Result<(), (&'static str, &'static str)> {
    if workers == 0 {
        return Err((WORKER_COUNT.name, "worker count must be at least 1"));
    }
    Ok(())
}

/// Accepts `4` as well as `4.0`; rejects fractional or out of range values.
fn integer<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let text = String::deserialize(deserializer)?;
    let text = text.trim();
    let value = match text.parse::<u64>() {
        Ok(value) => value,
        Err(_) => match text.parse::<f64>() {
            Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
                f as u64
            }
            _ => {
                return Err(de::Error::custom(format!(
                    "`{text}` is not a non-negative integer"
                )))
            }
        },
    };
    T::try_from(value).map_err(|_| de::Error::custom(format!("`{text}` is out of range")))
}
