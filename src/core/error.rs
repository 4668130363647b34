use crate::core::location::LocationId;
use crate::core::product::ProductId;
use thiserror::Error;

/// Contract violations by the caller of the rebalancing core.
///
/// Data-quality conditions (blank product ids, duplicate rows, empty
/// batches) are never errors; they surface as diagnostics instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RebalanceError {
    #[error("known-location set is empty but {article_count} article(s) were supplied")]
    EmptyLocationSet { article_count: usize },
    #[error("row for product {product} names location {location}, which is not in the known-location set")]
    UnknownLocation {
        product: ProductId,
        location: LocationId,
    },
}
