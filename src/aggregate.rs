use std::collections::BTreeMap;

use crate::{PlotError, Result, StrongRow, WeakRow};

/// Mean execution time of every run sharing one (batch size, worker count) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub batch_size: u32,
    pub mean_execution_time: f64,
}

/// Trend points of one worker count, ordered by increasing batch size.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine {
    pub worker_count: u32,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatedGroup {
    pub worker_count: u32,
    pub mean_execution_time: f64,
    pub max_images_tested: u64,
    /// `max_images_tested` as a percentage of the largest value across all groups.
    pub images_pct: f64,
}

/// Running mean; stays finite for any finite, non-negative input.
#[derive(Default)]
struct Mean {
    mean: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
    }

    fn value(&self) -> f64 {
        self.mean
    }
}

/// One line per worker count, in ascending worker order.
///
/// Fails with `TrendLayer` when a mean is not a finite number, which only
/// happens for rows that bypassed loader validation.
pub fn trend_lines(rows: &[StrongRow]) -> Result<Vec<TrendLine>> {
    let mut groups: BTreeMap<(u32, u32), Mean> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.worker_count, row.batch_size))
            .or_default()
            .push(row.execution_time);
    }

    let mut lines: Vec<TrendLine> = Vec::new();
    for ((worker_count, batch_size), mean) in groups {
        let mean_execution_time = mean.value();
        if !mean_execution_time.is_finite() {
            return Err(PlotError::TrendLayer(format!(
                "mean execution time for workers={worker_count} batch_size={batch_size} is not finite"
            )));
        }
        let point = TrendPoint {
            batch_size,
            mean_execution_time,
        };
        match lines.last_mut() {
            Some(line) if line.worker_count == worker_count => line.points.push(point),
            _ => lines.push(TrendLine {
                worker_count,
                points: vec![point],
            }),
        }
    }
    Ok(lines)
}

/// One group per worker count, sorted by worker count ascending.
pub fn aggregate_by_workers(rows: &[WeakRow]) -> Vec<AggregatedGroup> {
    let mut groups: BTreeMap<u32, (Mean, u64)> = BTreeMap::new();
    for row in rows {
        let (mean, max_images) = groups.entry(row.worker_count).or_default();
        mean.push(row.execution_time);
        *max_images = (*max_images).max(row.images_tested);
    }

    let global_max = groups.values().map(|(_, max)| *max).max().unwrap_or(0);
    groups
        .into_iter()
        .map(|(worker_count, (mean, max_images_tested))| AggregatedGroup {
            worker_count,
            mean_execution_time: mean.value(),
            max_images_tested,
            images_pct: percent_of(max_images_tested, global_max),
        })
        .collect()
}

fn percent_of(value: u64, max: u64) -> f64 {
    // every group equals the maximum when nothing was tested
    if max == 0 {
        return 100.0;
    }
    value as f64 / max as f64 * 100.0
}
