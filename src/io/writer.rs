//! Persists a [`RebalanceResult`] to an output directory.
//!
//! Each table becomes `<name>.csv`. Rebalance candidates and run metadata
//! are written as pretty-printed JSON.

use crate::analysis::classification::ClassifiedLocation;
use crate::analysis::consolidation::ConsolidationReport;
use crate::core::config::ColumnNames;
use crate::core::location::LocationSet;
use crate::core::stock_row::StockSnapshot;
use crate::io::loader::LoadReport;
use crate::io::tables::{all_tables, Table};
use crate::optimization::pipeline::RebalanceResult;
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

pub const CANDIDATES_FILE: &str = "rebalance_candidates.json";
pub const REPORT_FILE: &str = "report.json";
/// All loaded rows in one table, with the export file of each row.
pub const COMBINED_FILE: &str = "stock_combined.csv";
/// Trailing column of a snapshot CSV naming each row's export file.
pub const SOURCE_COLUMN: &str = "Source";

/// Errors raised while writing outputs.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("cannot write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to serialize '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Need and surplus positions of one rebalance candidate.
#[derive(Debug, Serialize)]
pub struct CandidateDetail<'a> {
    pub product_id: &'a str,
    pub label: &'a str,
    pub total_need: u64,
    pub total_surplus: u64,
    pub needs: Vec<&'a ClassifiedLocation>,
    pub surpluses: Vec<&'a ClassifiedLocation>,
}

/// Run metadata and headline figures.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub source_floor: u64,
    pub locations: &'a LocationSet,
    pub articles: usize,
    pub rebalance_candidates: usize,
    pub recommendations: usize,
    pub units_recommended: u64,
    pub candidate_need: u64,
    pub coverage_percent: f64,
    pub consolidation: &'a ConsolidationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<&'a LoadReport>,
}

impl<'a> RunReport<'a> {
    pub fn new(result: &'a RebalanceResult, load: Option<&'a LoadReport>) -> Self {
        Self {
            run_id: result.run_id(),
            generated_at: result.generated_at(),
            source_floor: result.source_floor(),
            locations: result.locations(),
            articles: result.articles().len(),
            rebalance_candidates: result.candidates().count(),
            recommendations: result.recommendations().len(),
            units_recommended: result.units_recommended(),
            candidate_need: result.candidate_need(),
            coverage_percent: result.coverage_percent(),
            consolidation: result.report(),
            load,
        }
    }
}

/// Rebalance candidates in article order.
pub fn candidate_details(result: &RebalanceResult) -> Vec<CandidateDetail<'_>> {
    result
        .candidates()
        .map(|article| CandidateDetail {
            product_id: article.product_id().as_str(),
            label: article.label(),
            total_need: article.total_need(),
            total_surplus: article.total_surplus(),
            needs: article.needs().collect(),
            surpluses: article.surpluses().collect(),
        })
        .collect()
}

/// Write a snapshot as a CSV export with the given column names.
///
/// The output is readable by [`StockLoader`](crate::io::loader::StockLoader)
/// configured with the same names.
pub fn write_snapshot_csv<W: std::io::Write>(
    snapshot: &StockSnapshot,
    columns: &ColumnNames,
    out: W,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        columns.product_id.as_str(),
        columns.label.as_str(),
        columns.location.as_str(),
        columns.physical.as_str(),
        columns.sales.as_str(),
        columns.stock_min.as_str(),
        columns.stock_max.as_str(),
        columns.brand.as_str(),
        columns.primary_category.as_str(),
        columns.sub_category.as_str(),
        SOURCE_COLUMN,
    ])?;
    for row in snapshot.rows() {
        writer.write_record([
            row.product_id.as_str(),
            row.info.label.as_str(),
            row.location.as_str(),
            row.physical.to_string().as_str(),
            row.sales.to_string().as_str(),
            row.stock_min.to_string().as_str(),
            row.stock_max.to_string().as_str(),
            row.info.brand.as_str(),
            row.info.primary_category.as_str(),
            row.info.sub_category.as_str(),
            row.source.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes result files into one directory, creating it if needed.
pub struct ResultWriter {
    dir: PathBuf,
}

impl ResultWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, WriteError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| WriteError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the loaded rows as [`COMBINED_FILE`], in the input column layout.
    pub fn write_snapshot(
        &self,
        snapshot: &StockSnapshot,
        columns: &ColumnNames,
    ) -> Result<PathBuf, WriteError> {
        let path = self.dir.join(COMBINED_FILE);
        let file = fs::File::create(&path).map_err(|source| WriteError::Io {
            path: path.display().to_string(),
            source,
        })?;
        write_snapshot_csv(snapshot, columns, file).map_err(|source| WriteError::Csv {
            path: path.display().to_string(),
            source,
        })?;
        Ok(path)
    }

    /// Write a table as `<name>.csv`.
    pub fn write_table(&self, table: &Table) -> Result<PathBuf, WriteError> {
        let path = self.dir.join(format!("{}.csv", table.name()));
        let csv_err = |source: csv::Error| WriteError::Csv {
            path: path.display().to_string(),
            source,
        };

        let mut writer = csv::Writer::from_path(&path).map_err(csv_err)?;
        writer.write_record(table.headers()).map_err(csv_err)?;
        for row in table.rows() {
            writer
                .write_record(row.iter().map(|cell| cell.to_string()))
                .map_err(csv_err)?;
        }
        writer.flush().map_err(|source| WriteError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(path)
    }

    /// Write any serializable value as pretty JSON.
    pub fn write_json<T: Serialize + ?Sized>(
        &self,
        file_name: &str,
        value: &T,
    ) -> Result<PathBuf, WriteError> {
        let path = self.dir.join(file_name);
        let json = serde_json::to_string_pretty(value).map_err(|source| WriteError::Json {
            path: path.display().to_string(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| WriteError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(path)
    }

    /// Write every table, the candidate details and the run report.
    pub fn write_all(
        &self,
        result: &RebalanceResult,
        load: Option<&LoadReport>,
    ) -> Result<Vec<PathBuf>, WriteError> {
        let mut written = Vec::new();
        for table in all_tables(result) {
            written.push(self.write_table(&table)?);
        }
        written.push(self.write_json(CANDIDATES_FILE, &candidate_details(result))?);
        written.push(self.write_json(REPORT_FILE, &RunReport::new(result, load))?);

        info!("wrote {} file(s) to {}", written.len(), self.dir.display());
        Ok(written)
    }
}
