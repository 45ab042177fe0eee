//! Dataset loading.
//!
//! The reader is picked from the file extension: `.csv` and `.txt` are read as
//! comma separated text with a header row, `.parquet` through the Parquet
//! reader, and spreadsheets (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`) from
//! their first worksheet. Loading is the usual producer handed to the task
//! bridge.

use crate::error::{PreprocessingError, Result, ResultExt};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::{DateTime, Local};
use polars::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rows used to infer CSV column types.
const INFER_SCHEMA_ROWS: usize = 1000;

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetFormat {
    Csv,
    Parquet,
    Excel,
}

impl DatasetFormat {
    /// Pick the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "parquet" => Ok(Self::Parquet),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Ok(Self::Excel),
            _ => Err(PreprocessingError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }
}

/// A dataset together with where and when it was read.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub data: DataFrame,
    pub path: PathBuf,
    pub format: DatasetFormat,
    pub size_bytes: u64,
    pub loaded_at: DateTime<Local>,
}

impl LoadedDataset {
    /// Read `path` and record its metadata.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = DatasetFormat::from_path(path)?;
        let size_bytes = fs::metadata(path)?.len();
        let data = read(path, format)
            .context(format!("Failed to read '{}'", path.display()))?;

        info!(
            "Loaded {} ({} rows x {} columns, {} bytes)",
            path.display(),
            data.height(),
            data.width(),
            size_bytes
        );

        Ok(Self {
            data,
            path: path.to_path_buf(),
            format,
            size_bytes,
            loaded_at: Local::now(),
        })
    }

    /// File name without directories, for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Read a dataset from disk.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<DataFrame> {
    LoadedDataset::load(path).map(|loaded| loaded.data)
}

fn read(path: &Path, format: DatasetFormat) -> Result<DataFrame> {
    debug!("Reading {} as {:?}", path.display(), format);
    let df = match format {
        DatasetFormat::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?,
        DatasetFormat::Parquet => ParquetReader::new(File::open(path)?).finish()?,
        DatasetFormat::Excel => read_first_sheet(path)?,
    };
    Ok(df)
}

/// Read the first worksheet of a workbook; its first row holds the headers.
fn read_first_sheet(path: &Path) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or_else(|| {
        PreprocessingError::Spreadsheet(format!("'{}' has no worksheets", path.display()))
    })??;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let body: Vec<&[Data]> = rows.collect();

    let mut seen = Vec::with_capacity(header.len());
    let mut columns = Vec::with_capacity(header.len());
    for (idx, cell) in header.iter().enumerate() {
        let name = match cell {
            Data::Empty => format!("column_{}", idx + 1),
            other => other.to_string(),
        };
        if seen.contains(&name) {
            return Err(PreprocessingError::Spreadsheet(format!(
                "Duplicate header '{}' in '{}'",
                name,
                path.display()
            )));
        }
        let cells: Vec<Data> = body
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or(Data::Empty))
            .collect();
        columns.push(sheet_column(&name, &cells).into_column());
        seen.push(name);
    }

    Ok(DataFrame::new(columns)?)
}

/// Build a typed Series from worksheet cells.
///
/// Numeric cells whose values are all whole numbers become Int64, other
/// numeric columns Float64, all-boolean columns Boolean and everything else
/// String. Empty and error cells are null.
fn sheet_column(name: &str, cells: &[Data]) -> Series {
    let present: Vec<&Data> = cells
        .iter()
        .filter(|cell| !matches!(cell, Data::Empty | Data::Error(_)))
        .collect();
    let all_numeric = !present.is_empty()
        && present
            .iter()
            .all(|cell| matches!(cell, Data::Int(_) | Data::Float(_)));
    let all_bool = !present.is_empty() && present.iter().all(|cell| matches!(cell, Data::Bool(_)));

    if all_numeric {
        let values: Vec<Option<f64>> = cells.iter().map(cell_f64).collect();
        let whole = values
            .iter()
            .flatten()
            .all(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64);
        if whole {
            let ints: Vec<Option<i64>> = values.iter().map(|v| v.map(|v| v as i64)).collect();
            return Series::new(name.into(), ints);
        }
        return Series::new(name.into(), values);
    }
    if all_bool {
        let flags: Vec<Option<bool>> = cells
            .iter()
            .map(|cell| match cell {
                Data::Bool(flag) => Some(*flag),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), flags);
    }

    let strings: Vec<Option<String>> = cells
        .iter()
        .map(|cell| match cell {
            Data::Empty | Data::Error(_) => None,
            other => Some(other.to_string()),
        })
        .collect();
    Series::new(name.into(), strings)
}

fn cell_f64(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(v) => Some(*v as f64),
        Data::Float(v) => Some(*v),
        _ => None,
    }
}
