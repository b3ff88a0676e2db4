use std::{fs::File, io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;

use crate::{BenchmarkRow, PlotError, Result};

/// Rows of one benchmark CSV in file order. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<R> {
    rows: Vec<R>,
}

impl<R: BenchmarkRow> Dataset<R> {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PlotError::InputNotFound(path.to_path_buf()));
        }
        let file = File::open(path).map_err(PlotError::io(path))?;
        // reading a directory or a vanishing file fails inside the csv reader
        let dataset = Self::from_reader(file).map_err(|err| match err {
            PlotError::Csv(err) if err.is_io_error() => PlotError::io(path)(err.into()),
            err => err,
        })?;
        debug!("loaded {} rows from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        check_columns::<R>(&headers)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());
            let row: R = record
                .deserialize(Some(&headers))
                .map_err(|err| coercion_error(&headers, line, err))?;
            row.validate()
                .map_err(|(column, reason)| PlotError::TypeCoercion {
                    column: column.to_string(),
                    line,
                    reason: reason.to_string(),
                })?;
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(PlotError::EmptyDataset);
        }
        Ok(Self { rows })
    }
}

impl<R> Dataset<R> {
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<R> From<Vec<R>> for Dataset<R> {
    fn from(rows: Vec<R>) -> Self {
        Self { rows }
    }
}

fn check_columns<R: BenchmarkRow>(headers: &StringRecord) -> Result<()> {
    let missing: Vec<&'static str> = R::COLUMNS
        .iter()
        .filter(|column| !column.is_in(headers.iter()))
        .map(|column| column.name)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(PlotError::MissingColumn {
        required: R::COLUMNS.iter().map(|column| column.name).collect(),
        missing,
    })
}

fn coercion_error(headers: &StringRecord, line: u64, err: csv::Error) -> PlotError {
    if let csv::ErrorKind::Deserialize { err: de, .. } = err.kind() {
        let column = de
            .field()
            .and_then(|idx| headers.get(idx as usize))
            .unwrap_or("?")
            .to_string();
        return PlotError::TypeCoercion {
            column,
            line,
            reason: de.kind().to_string(),
        };
    }
    PlotError::Csv(err)
}

#[cfg(test)]
mod test {
    use super::Dataset;
    use crate::{PlotError, StrongRow, WeakRow};

    #[test]
    fn strong_rows_keep_file_order() {
        let csv = "execution_time,worker_count,batch_size\n5,1,8\n3,2,8\n4,1,16\n";
        let dataset = Dataset::<StrongRow>::from_reader(csv.as_bytes()).unwrap();
        let batches: Vec<u32> = dataset.rows().iter().map(|r| r.batch_size).collect();
        assert_eq!(vec![8, 8, 16], batches);
        assert_eq!(3.0, dataset.rows()[1].execution_time);
        assert_eq!(2, dataset.rows()[1].worker_count);
    }

    #[test]
    fn harness_headers_and_extra_columns() {
        let csv = "tempo_execucao_s,workers,batch_size,imagens_testadas\n1.5,4,32,640\n";
        let dataset = Dataset::<StrongRow>::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(
            &[StrongRow {
                execution_time: 1.5,
                worker_count: 4,
                batch_size: 32
            }],
            dataset.rows()
        );

        let dataset = Dataset::<WeakRow>::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(640, dataset.rows()[0].images_tested);
    }

    #[test]
    fn integer_columns_accept_integral_floats() {
        let csv = "execution_time,worker_count,images_tested\n 2.0 , 4.0 , 100.0 \n";
        let dataset = Dataset::<WeakRow>::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(4, dataset.rows()[0].worker_count);
        assert_eq!(100, dataset.rows()[0].images_tested);
    }

    #[test]
    fn missing_column_fails_before_rows_are_read() {
        // the second row would fail coercion if rows were parsed first
        let csv = "execution_time,worker_count\n1.0,2\nabc,x\n";
        match Dataset::<WeakRow>::from_reader(csv.as_bytes()) {
            Err(PlotError::MissingColumn { required, missing }) => {
                assert_eq!(vec!["execution_time", "worker_count", "images_tested"], required);
                assert_eq!(vec!["images_tested"], missing);
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_value_is_fatal() {
        let csv = "execution_time,worker_count,batch_size\n1.0,2,8\n1.0,two,8\n";
        match Dataset::<StrongRow>::from_reader(csv.as_bytes()) {
            Err(PlotError::TypeCoercion { column, line, .. }) => {
                assert_eq!("worker_count", column);
                assert_eq!(3, line);
            }
            other => panic!("expected TypeCoercion, got {other:?}"),
        }
    }

    #[test]
    fn fractional_integer_is_fatal() {
        let csv = "execution_time,worker_count,batch_size\n1.0,2,8.5\n";
        let err = Dataset::<StrongRow>::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, PlotError::TypeCoercion { ref column, .. } if column == "batch_size"));
    }

    #[test]
    fn out_of_domain_values_are_fatal() {
        let cases = [
            ("execution_time,worker_count,batch_size\n-1.0,2,8\n", "execution_time"),
            ("execution_time,worker_count,batch_size\nNaN,2,8\n", "execution_time"),
            ("execution_time,worker_count,batch_size\n1.0,0,8\n", "worker_count"),
            ("execution_time,worker_count,batch_size\n1.0,2,0\n", "batch_size"),
        ];
        for (csv, expected) in cases {
            match Dataset::<StrongRow>::from_reader(csv.as_bytes()) {
                Err(PlotError::TypeCoercion { column, line, .. }) => {
                    assert_eq!(expected, column);
                    assert_eq!(2, line);
                }
                other => panic!("expected TypeCoercion for {csv:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn header_only_file_is_empty() {
        let csv = "execution_time,worker_count,images_tested\n";
        let err = Dataset::<WeakRow>::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, PlotError::EmptyDataset));
    }

    #[test]
    fn missing_file_is_reported_before_parsing() {
        let err = Dataset::<WeakRow>::load("does/not/exist.csv").unwrap_err();
        assert!(matches!(err, PlotError::InputNotFound(_)));
        assert_eq!("CSV file not found: does/not/exist.csv", err.to_string());
    }

    #[test]
    fn unreadable_path_is_an_io_error() {
        let dir = std::env::temp_dir();
        match Dataset::<WeakRow>::load(&dir) {
            Err(PlotError::Io { path, .. }) => assert_eq!(dir, path),
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
