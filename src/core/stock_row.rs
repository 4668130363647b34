use crate::core::location::{LocationId, LocationSet};
use crate::core::product::{ProductId, ProductInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One product at one location, as reported by the location's stock export.
///
/// Numeric fields are already coerced to non-negative integers by the loader.
/// `stock_max == 0` means no ceiling is configured.
///
/// # Examples
///
/// ```
/// use stock_rebalancer::core::stock_row::LocationStockRow;
/// use stock_rebalancer::core::location::LocationId;
/// use stock_rebalancer::core::product::ProductId;
///
/// let row = LocationStockRow::new(ProductId::new("X"), LocationId::new("A"), 2, 5, 10)
///     .with_sales(7);
///
/// assert_eq!(row.physical, 2);
/// assert_eq!(row.sales, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationStockRow {
    pub product_id: ProductId,
    #[serde(flatten)]
    pub info: ProductInfo,
    pub location: LocationId,
    /// Units physically on hand.
    pub physical: u64,
    /// Recent sales velocity.
    pub sales: u64,
    pub stock_min: u64,
    pub stock_max: u64,
    /// File name of the export the row was read from, when loaded from disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl LocationStockRow {
    pub fn new(
        product_id: ProductId,
        location: LocationId,
        physical: u64,
        stock_min: u64,
        stock_max: u64,
    ) -> Self {
        Self {
            product_id,
            info: ProductInfo::default(),
            location,
            physical,
            sales: 0,
            stock_min,
            stock_max,
            source: None,
        }
    }

    pub fn with_sales(mut self, sales: u64) -> Self {
        self.sales = sales;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_info(mut self, info: ProductInfo) -> Self {
        self.info = info;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.info.label = label.into();
        self
    }
}

/// The four stock figures of one product at one location.
///
/// All-zero figures are what a location that never stocks a product looks
/// like, and are indistinguishable from a location holding zero of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationStock {
    pub physical: u64,
    pub sales: u64,
    pub stock_min: u64,
    pub stock_max: u64,
}

impl LocationStock {
    pub fn new(physical: u64, stock_min: u64, stock_max: u64) -> Self {
        Self {
            physical,
            sales: 0,
            stock_min,
            stock_max,
        }
    }

    pub fn with_sales(mut self, sales: u64) -> Self {
        self.sales = sales;
        self
    }

    /// True when a maximum is configured.
    pub fn has_ceiling(&self) -> bool {
        self.stock_max > 0
    }
}

impl From<&LocationStockRow> for LocationStock {
    fn from(row: &LocationStockRow) -> Self {
        Self {
            physical: row.physical,
            sales: row.sales,
            stock_min: row.stock_min,
            stock_max: row.stock_max,
        }
    }
}

/// A complete batch of rows across all locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockSnapshot {
    rows: Vec<LocationStockRow>,
}

impl StockSnapshot {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add(&mut self, row: LocationStockRow) {
        self.rows.push(row);
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = LocationStockRow>) {
        self.rows.extend(rows);
    }

    pub fn rows(&self) -> &[LocationStockRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The known-location set: every location named by a row, sorted.
    pub fn locations(&self) -> LocationSet {
        LocationSet::sorted(self.rows.iter().map(|r| r.location.clone()))
    }

    /// Distinct non-blank product identifiers, sorted.
    pub fn products(&self) -> Vec<ProductId> {
        let mut products: Vec<ProductId> = self
            .rows
            .iter()
            .filter(|r| !r.product_id.is_blank())
            .map(|r| r.product_id.clone())
            .collect();
        products.sort();
        products.dedup();
        products
    }

    /// Number of rows repeating an earlier `(product, location)` pair.
    pub fn duplicate_count(&self) -> usize {
        let mut seen: HashSet<(&ProductId, &LocationId)> = HashSet::new();
        self.rows
            .iter()
            .filter(|r| !seen.insert((&r.product_id, &r.location)))
            .count()
    }

    /// Total units on hand across the whole batch.
    pub fn total_physical(&self) -> u64 {
        saturating_total(self.rows.iter().map(|r| r.physical))
    }
}

/// Sum of quantities, clamped at `u64::MAX` instead of overflowing.
///
/// The loader maps oversized spreadsheet cells to `u64::MAX`, so any total
/// over loaded figures can exceed the integer range.
pub fn saturating_total(quantities: impl IntoIterator<Item = u64>) -> u64 {
    quantities
        .into_iter()
        .fold(0u64, |acc, qty| acc.saturating_add(qty))
}

impl FromIterator<LocationStockRow> for StockSnapshot {
    fn from_iter<T: IntoIterator<Item = LocationStockRow>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(product: &str, location: &str, physical: u64) -> LocationStockRow {
        LocationStockRow::new(ProductId::new(product), LocationId::new(location), physical, 1, 5)
    }

    #[test]
    fn test_snapshot_locations_sorted() {
        let snapshot: StockSnapshot = vec![row("X", "B", 1), row("X", "A", 2), row("Y", "B", 3)]
            .into_iter()
            .collect();
        let locations = snapshot.locations();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations.as_slice()[0].as_str(), "A");
        assert_eq!(snapshot.total_physical(), 6);
    }

    #[test]
    fn test_snapshot_products_skip_blank() {
        let snapshot: StockSnapshot = vec![row("Y", "A", 1), row(" ", "A", 1), row("X", "A", 1)]
            .into_iter()
            .collect();
        let products = snapshot.products();
        assert_eq!(products, vec![ProductId::new("X"), ProductId::new("Y")]);
    }

    #[test]
    fn test_duplicate_count() {
        let snapshot: StockSnapshot = vec![
            row("X", "A", 1),
            row("X", "A", 4),
            row("X", "B", 1),
            row("X", "A", 9),
        ]
        .into_iter()
        .collect();
        assert_eq!(snapshot.duplicate_count(), 2);
    }
}
