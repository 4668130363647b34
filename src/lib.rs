//! # stock-rebalancer
//!
//! Multi-location inventory rebalancing engine.
//!
//! Given per-location stock exports (physical quantity, sales, minimum and
//! maximum thresholds), this engine finds locations short of stock and
//! locations holding a safe surplus of the same product, and recommends
//! transfers between them.
//!
//! ## Architecture
//!
//! - **core**: Foundational types: locations, products, stock rows, transfers, config
//! - **analysis**: Consolidation, threshold classification, category breakdown
//! - **optimization**: Greedy transfer allocation, per-location summaries, the end-to-end engine
//! - **io**: Spreadsheet loading, output tables, result files
//! - **simulation**: Random snapshot generation for stress tests

pub mod analysis;
pub mod core;
pub mod io;
pub mod optimization;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::analysis::classification::{LocationPosition, ProductStatus, StockClassifier};
    pub use crate::core::config::RebalanceConfig;
    pub use crate::core::error::RebalanceError;
    pub use crate::core::location::{LocationId, LocationSet};
    pub use crate::core::product::{ProductId, ProductInfo};
    pub use crate::core::stock_row::{LocationStock, LocationStockRow, StockSnapshot};
    pub use crate::core::transfer::TransferRecommendation;
    pub use crate::io::loader::StockLoader;
    pub use crate::io::writer::ResultWriter;
    pub use crate::optimization::pipeline::{RebalanceEngine, RebalanceResult};
}
