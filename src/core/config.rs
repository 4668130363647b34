use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default minimum quantity a donor location keeps after any transfer.
pub const DEFAULT_SOURCE_FLOOR: u64 = 1;

/// Errors arising from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Header names of the input stock exports.
///
/// Defaults match the column headers of the shops' spreadsheet exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub product_id: String,
    pub label: String,
    pub location: String,
    pub physical: String,
    pub sales: String,
    pub stock_min: String,
    pub stock_max: String,
    pub brand: String,
    pub primary_category: String,
    pub sub_category: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            product_id: "Code-barres article".to_string(),
            label: "Libellé article".to_string(),
            location: "Dépôt".to_string(),
            physical: "Physique".to_string(),
            sales: "Ventes FO".to_string(),
            stock_min: "Stock minimum".to_string(),
            stock_max: "Stock maximum".to_string(),
            brand: "MARQUE".to_string(),
            primary_category: "CATEGORIE PRINCIPALE".to_string(),
            sub_category: "SOUS-CATEGORIE".to_string(),
        }
    }
}

impl ColumnNames {
    /// Columns a file must carry to be usable.
    pub fn required(&self) -> [&str; 7] {
        [
            self.label.as_str(),
            self.location.as_str(),
            self.physical.as_str(),
            self.sales.as_str(),
            self.stock_max.as_str(),
            self.stock_min.as_str(),
            self.product_id.as_str(),
        ]
    }

    /// Descriptive columns that default to empty when absent.
    pub fn optional(&self) -> [&str; 3] {
        [
            self.brand.as_str(),
            self.primary_category.as_str(),
            self.sub_category.as_str(),
        ]
    }
}

/// Tunable parameters of a rebalancing run.
///
/// Every field is optional in a config file; missing fields take their
/// default.
///
/// # Examples
///
/// ```
/// use stock_rebalancer::core::config::RebalanceConfig;
///
/// let config: RebalanceConfig = serde_json::from_str(r#"{ "source_floor": 2 }"#).unwrap();
/// assert_eq!(config.source_floor, 2);
/// assert!(config.parallel);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebalanceConfig {
    /// Minimum physical quantity a source location must retain.
    pub source_floor: u64,
    /// Input header names.
    pub columns: ColumnNames,
    /// Case-insensitive substring an input file name must contain
    /// when a directory is scanned.
    pub file_filter: String,
    /// Classify and allocate products on a thread pool.
    pub parallel: bool,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            source_floor: DEFAULT_SOURCE_FLOOR,
            columns: ColumnNames::default(),
            file_filter: "stock".to_string(),
            parallel: true,
        }
    }
}

impl RebalanceConfig {
    pub fn with_source_floor(mut self, source_floor: u64) -> Self {
        self.source_floor = source_floor;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RebalanceConfig::default();
        assert_eq!(config.source_floor, 1);
        assert_eq!(config.columns.location, "Dépôt");
        assert_eq!(config.file_filter, "stock");
    }

    #[test]
    fn test_partial_columns_override() {
        let config: RebalanceConfig =
            serde_json::from_str(r#"{ "columns": { "location": "Store" } }"#).unwrap();
        assert_eq!(config.columns.location, "Store");
        assert_eq!(config.columns.physical, "Physique");
        assert_eq!(config.source_floor, 1);
    }

    #[test]
    fn test_required_columns() {
        let columns = ColumnNames::default();
        assert!(columns.required().contains(&"Code-barres article"));
        assert!(!columns.required().contains(&"MARQUE"));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "source_floor": 3, "parallel": false }}"#).unwrap();
        let config = RebalanceConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.source_floor, 3);
        assert!(!config.parallel);
    }

    #[test]
    fn test_from_json_file_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        let err = RebalanceConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
