use crate::core::location::LocationId;
use crate::core::product::ProductId;
use crate::core::stock_row::LocationStock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A proposed movement of units of one product from one location to another.
///
/// Carries the thresholds and pre-transfer quantities of both ends so the
/// recommendation can be audited on its own. A recommendation is a logical
/// (source, destination, quantity) triple; it says nothing about logistics.
///
/// # Examples
///
/// ```
/// use stock_rebalancer::core::transfer::TransferRecommendation;
/// use stock_rebalancer::core::location::LocationId;
/// use stock_rebalancer::core::product::ProductId;
/// use stock_rebalancer::core::stock_row::LocationStock;
///
/// let rec = TransferRecommendation::new(
///     ProductId::new("X"),
///     "Robe lin",
///     LocationId::new("B"),
///     LocationId::new("A"),
///     3,
///     LocationStock::new(15, 5, 10),
///     LocationStock::new(2, 5, 10),
/// );
///
/// assert_eq!(rec.quantity(), 3);
/// assert_eq!(rec.source().as_str(), "B");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecommendation {
    product_id: ProductId,
    label: String,
    source: LocationId,
    destination: LocationId,
    /// Units to move. Always positive.
    quantity: u64,
    /// Source figures before the transfer.
    source_stock: LocationStock,
    /// Destination figures before the transfer.
    destination_stock: LocationStock,
}

impl TransferRecommendation {
    /// Create a new recommendation.
    ///
    /// # Panics
    ///
    /// Panics if `quantity` is zero or if source and destination are equal.
    pub fn new(
        product_id: ProductId,
        label: impl Into<String>,
        source: LocationId,
        destination: LocationId,
        quantity: u64,
        source_stock: LocationStock,
        destination_stock: LocationStock,
    ) -> Self {
        assert!(quantity > 0, "Transfer quantity must be positive, got {}", quantity);
        assert!(
            source != destination,
            "Transfer source and destination must differ, got {} twice",
            source
        );
        Self {
            product_id,
            label: label.into(),
            source,
            destination,
            quantity,
            source_stock,
            destination_stock,
        }
    }

    // --- Accessors ---

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source(&self) -> &LocationId {
        &self.source
    }

    pub fn destination(&self) -> &LocationId {
        &self.destination
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn source_stock(&self) -> &LocationStock {
        &self.source_stock
    }

    pub fn destination_stock(&self) -> &LocationStock {
        &self.destination_stock
    }
}

impl fmt::Display for TransferRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {} -> {} x{}",
            self.product_id, self.label, self.source, self.destination, self.quantity
        )
    }
}
