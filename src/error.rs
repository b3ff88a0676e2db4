use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("CSV file not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error(
        "CSV must contain columns: {} (missing: {})",
        .required.join(", "),
        .missing.join(", ")
    )]
    MissingColumn {
        required: Vec<&'static str>,
        missing: Vec<&'static str>,
    },
    #[error("cannot read column `{column}` on line {line}: {reason}")]
    TypeCoercion {
        column: String,
        line: u64,
        reason: String,
    },
    #[error("CSV contains no data rows")]
    EmptyDataset,
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("trend layer skipped: {0}")]
    TrendLayer(String),
    #[error("cannot clamp Y axis to {bound}: {reason}")]
    AxisClamp { bound: f64, reason: &'static str },
    #[error("values too large to plot: {0}")]
    Unplottable(String),
    #[error("failed to render chart: {0}")]
    Render(String),
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to open image viewer: {0}")]
    Display(std::io::Error),
}

impl PlotError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> PlotError {
        let path = path.into();
        move |source| PlotError::Io { path, source }
    }

    /// Errors after which a chart is still produced, just without the affected layer.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PlotError::TrendLayer(_) | PlotError::AxisClamp { .. } | PlotError::Display(_)
        )
    }
}

#[cfg(test)]
mod test {
    use super::PlotError;

    #[test]
    fn missing_column_lists_required_and_missing() {
        let err = PlotError::MissingColumn {
            required: vec!["execution_time", "worker_count", "images_tested"],
            missing: vec!["images_tested"],
        };
        assert_eq!(
            err.to_string(),
            "CSV must contain columns: execution_time, worker_count, images_tested (missing: images_tested)"
        );
        assert!(!err.is_recoverable());
    }

    #[test]
    fn layer_errors_are_recoverable() {
        assert!(PlotError::TrendLayer("mean overflowed".into()).is_recoverable());
        assert!(PlotError::AxisClamp {
            bound: -1.0,
            reason: "must be positive"
        }
        .is_recoverable());
        assert!(!PlotError::EmptyDataset.is_recoverable());
        assert!(!PlotError::Unplottable("inf".into()).is_recoverable());
    }

    #[test]
    fn io_errors_name_the_path() {
        let err = PlotError::io("results/run.csv")(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "permission denied",
        ));
        assert_eq!("cannot access results/run.csv: permission denied", err.to_string());
        assert!(!err.is_recoverable());
    }
}
