//! Consolidation of per-location rows into one record per product.
//!
//! Rows are grouped by product identifier. Each group yields a single
//! [`ConsolidatedArticle`] carrying the representative descriptive fields,
//! batch-wide totals, and the stock figures of every known location.

use crate::core::error::RebalanceError;
use crate::core::location::{LocationId, LocationSet};
use crate::core::product::{ProductId, ProductInfo};
use crate::core::stock_row::{saturating_total, LocationStock, LocationStockRow};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One product across all known locations.
///
/// Built once per batch and never updated afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedArticle {
    product_id: ProductId,
    info: ProductInfo,
    total_physical: u64,
    total_sales: u64,
    /// Figures for every known location; zero-filled where no row exists.
    stocks: BTreeMap<LocationId, LocationStock>,
}

impl ConsolidatedArticle {
    /// Build an article directly from per-location figures.
    ///
    /// Totals are derived from the figures given.
    pub fn new(
        product_id: ProductId,
        info: ProductInfo,
        stocks: impl IntoIterator<Item = (LocationId, LocationStock)>,
    ) -> Self {
        let stocks: BTreeMap<LocationId, LocationStock> = stocks.into_iter().collect();
        let total_physical = saturating_total(stocks.values().map(|s| s.physical));
        let total_sales = saturating_total(stocks.values().map(|s| s.sales));
        Self {
            product_id,
            info,
            total_physical,
            total_sales,
            stocks,
        }
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn info(&self) -> &ProductInfo {
        &self.info
    }

    pub fn label(&self) -> &str {
        &self.info.label
    }

    pub fn total_physical(&self) -> u64 {
        self.total_physical
    }

    pub fn total_sales(&self) -> u64 {
        self.total_sales
    }

    /// Figures at a location; zero when the location is unknown to this article.
    pub fn stock(&self, location: &LocationId) -> LocationStock {
        self.stocks.get(location).copied().unwrap_or_default()
    }

    pub fn stocks(&self) -> &BTreeMap<LocationId, LocationStock> {
        &self.stocks
    }
}

/// Data-quality diagnostics gathered while consolidating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationReport {
    /// Rows seen.
    pub input_rows: usize,
    /// Rows skipped because their product identifier was blank.
    pub unidentifiable_rows: usize,
    /// `(product, location)` pairs reported more than once, with the number
    /// of ignored extra rows for each.
    pub duplicates: Vec<DuplicateRow>,
}

impl ConsolidationReport {
    /// Total number of ignored duplicate rows.
    pub fn duplicate_rows(&self) -> usize {
        self.duplicates.iter().map(|d| d.ignored).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.unidentifiable_rows == 0 && self.duplicates.is_empty()
    }
}

/// A repeated `(product, location)` pair. The first row won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateRow {
    pub product_id: ProductId,
    pub location: LocationId,
    pub ignored: usize,
}

/// Output of [`Consolidator::consolidate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Consolidation {
    pub articles: Vec<ConsolidatedArticle>,
    pub report: ConsolidationReport,
}

/// Merges per-location rows into one [`ConsolidatedArticle`] per product.
pub struct Consolidator;

impl Consolidator {
    /// Consolidate a batch of rows against the known-location set.
    ///
    /// # Algorithm
    ///
    /// 1. Skip rows whose product identifier is blank, counting them.
    /// 2. Group the remaining rows by product, keeping input order.
    /// 3. Descriptive fields: first non-blank value in the group, per field.
    /// 4. Totals: sum of physical and sales over every row of the group,
    ///    saturating at `u64::MAX`.
    /// 5. Per known location: figures of the first row for that location,
    ///    later rows are reported as duplicates; zeros if there is none.
    ///
    /// Articles are returned sorted by product identifier.
    ///
    /// # Errors
    ///
    /// Fails when identifiable rows exist but the location set is empty, or
    /// when a row names a location outside the set.
    pub fn consolidate(
        rows: &[LocationStockRow],
        locations: &LocationSet,
    ) -> Result<Consolidation, RebalanceError> {
        let mut report = ConsolidationReport {
            input_rows: rows.len(),
            ..Default::default()
        };

        let mut groups: BTreeMap<&ProductId, Vec<&LocationStockRow>> = BTreeMap::new();
        for row in rows {
            if row.product_id.is_blank() {
                report.unidentifiable_rows += 1;
                continue;
            }
            groups.entry(&row.product_id).or_default().push(row);
        }

        if report.unidentifiable_rows > 0 {
            warn!(
                "{} row(s) without a product identifier skipped",
                report.unidentifiable_rows
            );
        }

        if locations.is_empty() && !groups.is_empty() {
            return Err(RebalanceError::EmptyLocationSet {
                article_count: groups.len(),
            });
        }

        let mut articles = Vec::with_capacity(groups.len());
        for (product_id, group) in groups {
            articles.push(Self::consolidate_group(
                product_id,
                &group,
                locations,
                &mut report,
            )?);
        }

        info!(
            "consolidated {} row(s) into {} article(s) across {} location(s)",
            report.input_rows,
            articles.len(),
            locations.len()
        );

        Ok(Consolidation { articles, report })
    }

    fn consolidate_group(
        product_id: &ProductId,
        group: &[&LocationStockRow],
        locations: &LocationSet,
        report: &mut ConsolidationReport,
    ) -> Result<ConsolidatedArticle, RebalanceError> {
        let info = ProductInfo {
            label: first_non_blank(group, |r| &r.info.label),
            brand: first_non_blank(group, |r| &r.info.brand),
            primary_category: first_non_blank(group, |r| &r.info.primary_category),
            sub_category: first_non_blank(group, |r| &r.info.sub_category),
        };

        let total_physical = saturating_total(group.iter().map(|r| r.physical));
        let total_sales = saturating_total(group.iter().map(|r| r.sales));

        let mut first_rows: HashMap<&LocationId, &LocationStockRow> = HashMap::new();
        let mut extra_rows: BTreeMap<&LocationId, usize> = BTreeMap::new();
        for &row in group {
            if !locations.contains(&row.location) {
                return Err(RebalanceError::UnknownLocation {
                    product: product_id.clone(),
                    location: row.location.clone(),
                });
            }
            if first_rows.contains_key(&row.location) {
                *extra_rows.entry(&row.location).or_insert(0) += 1;
            } else {
                first_rows.insert(&row.location, row);
            }
        }

        for (location, ignored) in extra_rows {
            warn!(
                "duplicate rows for product {} at {}: first kept, {} ignored",
                product_id, location, ignored
            );
            report.duplicates.push(DuplicateRow {
                product_id: product_id.clone(),
                location: location.clone(),
                ignored,
            });
        }

        let stocks = locations
            .iter()
            .map(|location| {
                let stock = first_rows
                    .get(location)
                    .map(|row| LocationStock::from(*row))
                    .unwrap_or_default();
                (location.clone(), stock)
            })
            .collect();

        Ok(ConsolidatedArticle {
            product_id: product_id.clone(),
            info,
            total_physical,
            total_sales,
            stocks,
        })
    }
}

/// First value that is not empty or whitespace, or an empty string.
fn first_non_blank<F>(group: &[&LocationStockRow], field: F) -> String
where
    F: Fn(&LocationStockRow) -> &String,
{
    group
        .iter()
        .map(|row| field(row))
        .find(|value| !value.trim().is_empty())
        .cloned()
        .unwrap_or_default()
}
