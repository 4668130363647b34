//! Reads per-location stock exports into a [`StockSnapshot`].
//!
//! Accepts CSV and Excel workbooks (first sheet), either as a single file
//! or as a directory of exports. Values are trimmed and numeric columns are
//! coerced to non-negative integers before anything reaches the core.

use crate::core::config::{ColumnNames, RebalanceConfig};
use crate::core::location::LocationId;
use crate::core::product::{ProductId, ProductInfo};
use crate::core::stock_row::{LocationStockRow, StockSnapshot};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use log::{info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading stock exports.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input not found: {0}")]
    NotFound(String),

    #[error("unsupported file format: '{0}' (expected .csv, .xlsx or .xls)")]
    UnsupportedFormat(String),

    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CSV in '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("invalid workbook '{path}': {message}")]
    Excel { path: String, message: String },

    #[error("'{path}' is missing required column(s): {}", .columns.join(", "))]
    MissingColumns { path: String, columns: Vec<String> },

    #[error("no usable stock rows found in '{0}'")]
    NoData(String),
}

/// A file that was skipped during a directory scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadIssue {
    pub path: PathBuf,
    pub reason: String,
}

/// What the loader read, skipped and noticed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub files_read: Vec<PathBuf>,
    pub issues: Vec<LoadIssue>,
    pub rows_loaded: usize,
    /// Rows dropped because their location cell was empty.
    pub rows_without_location: usize,
    /// Extra rows for an already-seen (product, location) pair.
    pub duplicate_rows: usize,
}

/// Header names and raw string records of one sheet.
struct RawTable {
    headers: Vec<String>,
    records: Vec<HashMap<String, String>>,
}

/// Coerce a spreadsheet cell to a stock quantity.
///
/// Blanks, unparsable text, negative and non-finite numbers all become 0.
/// Fractions are truncated.
///
/// ```
/// use stock_rebalancer::io::loader::coerce_quantity;
///
/// assert_eq!(coerce_quantity("12"), 12);
/// assert_eq!(coerce_quantity(" 7.9 "), 7);
/// assert_eq!(coerce_quantity("-3"), 0);
/// assert_eq!(coerce_quantity("n/a"), 0);
/// ```
pub fn coerce_quantity(raw: &str) -> u64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value.trunc() as u64,
        _ => 0,
    }
}

/// Loads stock exports using the configured column names and file filter.
pub struct StockLoader {
    columns: ColumnNames,
    file_filter: String,
}

impl Default for StockLoader {
    fn default() -> Self {
        Self::new(&RebalanceConfig::default())
    }
}

impl StockLoader {
    pub fn new(config: &RebalanceConfig) -> Self {
        Self {
            columns: config.columns.clone(),
            file_filter: config.file_filter.to_lowercase(),
        }
    }

    /// Load a single export or every matching export in a directory.
    ///
    /// An explicitly named file that cannot be used is an error. Inside a
    /// directory, unusable files are skipped and reported in
    /// [`LoadReport::issues`].
    pub fn load(&self, input: impl AsRef<Path>) -> Result<(StockSnapshot, LoadReport), LoadError> {
        let input = input.as_ref();
        if !input.exists() {
            return Err(LoadError::NotFound(input.display().to_string()));
        }

        let mut report = LoadReport::default();
        let mut snapshot = StockSnapshot::new();

        if input.is_dir() {
            for path in self.discover(input)? {
                match self.load_file(&path, &mut report) {
                    Ok(rows) => {
                        snapshot.extend(rows);
                        report.files_read.push(path);
                    }
                    Err(err) => {
                        warn!("skipping {}: {}", path.display(), err);
                        report.issues.push(LoadIssue {
                            path,
                            reason: err.to_string(),
                        });
                    }
                }
            }
        } else {
            let rows = self.load_file(input, &mut report)?;
            snapshot.extend(rows);
            report.files_read.push(input.to_path_buf());
        }

        if snapshot.is_empty() {
            return Err(LoadError::NoData(input.display().to_string()));
        }

        report.rows_loaded = snapshot.len();
        report.duplicate_rows = snapshot.duplicate_count();
        if report.duplicate_rows > 0 {
            warn!(
                "{} duplicate (product, location) row(s) in input; first occurrence will be used",
                report.duplicate_rows
            );
        }
        info!(
            "loaded {} row(s) from {} file(s), {} location(s)",
            report.rows_loaded,
            report.files_read.len(),
            snapshot.locations().len()
        );

        Ok((snapshot, report))
    }

    /// Matching export files in a directory, sorted by name.
    ///
    /// Office lock files (`~$...`) are ignored.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
        let entries = std::fs::read_dir(dir).map_err(|source| LoadError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| LoadError::Io {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_lowercase(),
                None => continue,
            };
            if name.starts_with('~') || !name.contains(&self.file_filter) {
                continue;
            }
            if matches!(extension_of(&path).as_str(), "csv" | "xlsx" | "xls") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn load_file(
        &self,
        path: &Path,
        report: &mut LoadReport,
    ) -> Result<Vec<LocationStockRow>, LoadError> {
        let table = match extension_of(path).as_str() {
            "csv" => read_csv(path)?,
            "xlsx" | "xls" => read_workbook(path)?,
            other => return Err(LoadError::UnsupportedFormat(other.to_string())),
        };

        let missing: Vec<String> = self
            .columns
            .required()
            .iter()
            .filter(|column| !table.headers.iter().any(|h| h.as_str() == **column))
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns {
                path: path.display().to_string(),
                columns: missing,
            });
        }

        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mut rows = Vec::with_capacity(table.records.len());
        let mut without_location = 0;
        for record in &table.records {
            match self.to_row(record) {
                Some(row) => rows.push(row.with_source(source.as_str())),
                None => without_location += 1,
            }
        }
        if without_location > 0 {
            warn!(
                "{}: {} row(s) without a location skipped",
                path.display(),
                without_location
            );
        }
        report.rows_without_location += without_location;

        info!("{}: {} row(s)", path.display(), rows.len());
        Ok(rows)
    }

    fn to_row(&self, record: &HashMap<String, String>) -> Option<LocationStockRow> {
        let columns = &self.columns;
        let location = field(record, &columns.location);
        if location.is_empty() {
            return None;
        }

        let info = ProductInfo::new(field(record, &columns.label))
            .with_brand(field(record, &columns.brand))
            .with_categories(
                field(record, &columns.primary_category),
                field(record, &columns.sub_category),
            );

        Some(
            LocationStockRow::new(
                ProductId::new(field(record, &columns.product_id)),
                LocationId::new(location),
                coerce_quantity(field(record, &columns.physical)),
                coerce_quantity(field(record, &columns.stock_min)),
                coerce_quantity(field(record, &columns.stock_max)),
            )
            .with_sales(coerce_quantity(field(record, &columns.sales)))
            .with_info(info),
        )
    }
}

fn field<'r>(record: &'r HashMap<String, String>, column: &str) -> &'r str {
    record.get(column).map(|v| v.trim()).unwrap_or("")
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn read_csv(path: &Path) -> Result<RawTable, LoadError> {
    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.display().to_string(),
        source,
    };

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        let row: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(|v| v.trim().to_string()))
            .collect();
        if row.values().all(|v| v.is_empty()) {
            continue;
        }
        records.push(row);
    }

    Ok(RawTable { headers, records })
}

fn read_workbook(path: &Path) -> Result<RawTable, LoadError> {
    let excel_err = |message: String| LoadError::Excel {
        path: path.display().to_string(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| excel_err(e.to_string()))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| excel_err("workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| excel_err(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect(),
        None => Vec::new(),
    };

    let mut records = Vec::new();
    for data_row in rows {
        let row: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(data_row.iter().map(|cell| cell.to_string().trim().to_string()))
            .collect();
        if row.values().all(|v| v.is_empty()) {
            continue;
        }
        records.push(row);
    }

    Ok(RawTable { headers, records })
}
