//! Threshold classification of each location's stock position.

use crate::analysis::consolidation::ConsolidatedArticle;
use crate::core::config::{RebalanceConfig, DEFAULT_SOURCE_FLOOR};
use crate::core::location::{LocationId, LocationSet};
use crate::core::product::{ProductId, ProductInfo};
use crate::core::stock_row::{saturating_total, LocationStock};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of one product at one location relative to its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationPosition {
    Ok,
    /// Physical quantity below the configured minimum.
    Need { need_qty: u64 },
    /// Physical quantity above the configured maximum, with something
    /// that can safely leave.
    Surplus {
        /// Units above the maximum.
        excess_qty: u64,
        /// Units above both the minimum and the source floor.
        available_qty: u64,
        /// `min(excess_qty, available_qty)`; always positive.
        transferable_qty: u64,
    },
}

impl LocationPosition {
    pub fn is_need(&self) -> bool {
        matches!(self, LocationPosition::Need { .. })
    }

    pub fn is_surplus(&self) -> bool {
        matches!(self, LocationPosition::Surplus { .. })
    }

    /// Shortfall below minimum, zero unless NEED.
    pub fn need_qty(&self) -> u64 {
        match self {
            LocationPosition::Need { need_qty } => *need_qty,
            _ => 0,
        }
    }

    /// Surplus quantity offered to other locations, zero unless SURPLUS.
    pub fn surplus_qty(&self) -> u64 {
        match self {
            LocationPosition::Surplus {
                transferable_qty, ..
            } => *transferable_qty,
            _ => 0,
        }
    }
}

impl fmt::Display for LocationPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationPosition::Ok => write!(f, "OK"),
            LocationPosition::Need { need_qty } => write!(f, "NEED ({})", need_qty),
            LocationPosition::Surplus {
                transferable_qty, ..
            } => write!(f, "SURPLUS ({})", transferable_qty),
        }
    }
}

/// Product-level status across all locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Ok,
    NeedOnly,
    SurplusOnly,
    /// At least one NEED and at least one SURPLUS location.
    RebalanceCandidate,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Ok => "OK",
            ProductStatus::NeedOnly => "NEED_ONLY",
            ProductStatus::SurplusOnly => "SURPLUS_ONLY",
            ProductStatus::RebalanceCandidate => "REBALANCE_CANDIDATE",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A location's figures together with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLocation {
    pub location: LocationId,
    pub stock: LocationStock,
    pub position: LocationPosition,
}

/// A consolidated article with every known location classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedArticle {
    product_id: ProductId,
    info: ProductInfo,
    status: ProductStatus,
    /// One entry per known location, in location-set order.
    locations: Vec<ClassifiedLocation>,
}

impl ClassifiedArticle {
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn info(&self) -> &ProductInfo {
        &self.info
    }

    pub fn label(&self) -> &str {
        &self.info.label
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn is_rebalance_candidate(&self) -> bool {
        self.status == ProductStatus::RebalanceCandidate
    }

    pub fn locations(&self) -> &[ClassifiedLocation] {
        &self.locations
    }

    pub fn position(&self, location: &LocationId) -> Option<&ClassifiedLocation> {
        self.locations.iter().find(|l| &l.location == location)
    }

    /// NEED locations in location-set order.
    pub fn needs(&self) -> impl Iterator<Item = &ClassifiedLocation> {
        self.locations.iter().filter(|l| l.position.is_need())
    }

    /// SURPLUS locations in location-set order.
    pub fn surpluses(&self) -> impl Iterator<Item = &ClassifiedLocation> {
        self.locations.iter().filter(|l| l.position.is_surplus())
    }

    pub fn total_need(&self) -> u64 {
        saturating_total(self.locations.iter().map(|l| l.position.need_qty()))
    }

    pub fn total_surplus(&self) -> u64 {
        saturating_total(self.locations.iter().map(|l| l.position.surplus_qty()))
    }
}

/// Labels each location's position against its min/max thresholds.
///
/// # Examples
///
/// ```
/// use stock_rebalancer::analysis::classification::{LocationPosition, StockClassifier};
/// use stock_rebalancer::core::stock_row::LocationStock;
///
/// let classifier = StockClassifier::new(1);
///
/// assert_eq!(
///     classifier.classify_location(&LocationStock::new(2, 5, 10)),
///     LocationPosition::Need { need_qty: 3 },
/// );
/// assert_eq!(
///     classifier.classify_location(&LocationStock::new(15, 5, 10)).surplus_qty(),
///     5,
/// );
/// // no ceiling configured: never a donor
/// assert_eq!(
///     classifier.classify_location(&LocationStock::new(50, 5, 0)),
///     LocationPosition::Ok,
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockClassifier {
    source_floor: u64,
}

impl Default for StockClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_FLOOR)
    }
}

impl StockClassifier {
    pub fn new(source_floor: u64) -> Self {
        Self { source_floor }
    }

    pub fn from_config(config: &RebalanceConfig) -> Self {
        Self::new(config.source_floor)
    }

    pub fn source_floor(&self) -> u64 {
        self.source_floor
    }

    /// Classify one location's figures.
    ///
    /// A location over its maximum whose transferable quantity is zero
    /// (the floor or its own minimum forbids any departure) is OK.
    pub fn classify_location(&self, stock: &LocationStock) -> LocationPosition {
        if stock.physical < stock.stock_min {
            return LocationPosition::Need {
                need_qty: stock.stock_min - stock.physical,
            };
        }

        if stock.has_ceiling() && stock.physical > stock.stock_max {
            let retained = stock.stock_min.max(self.source_floor);
            let available_qty = stock.physical.saturating_sub(retained);
            let excess_qty = stock.physical - stock.stock_max;
            let transferable_qty = available_qty.min(excess_qty);
            if transferable_qty > 0 {
                return LocationPosition::Surplus {
                    excess_qty,
                    available_qty,
                    transferable_qty,
                };
            }
        }

        LocationPosition::Ok
    }

    /// Classify every known location of an article and derive its status.
    pub fn classify(
        &self,
        article: &ConsolidatedArticle,
        locations: &LocationSet,
    ) -> ClassifiedArticle {
        let classified: Vec<ClassifiedLocation> = locations
            .iter()
            .map(|location| {
                let stock = article.stock(location);
                ClassifiedLocation {
                    location: location.clone(),
                    stock,
                    position: self.classify_location(&stock),
                }
            })
            .collect();

        let has_need = classified.iter().any(|l| l.position.is_need());
        let has_surplus = classified.iter().any(|l| l.position.is_surplus());
        let status = match (has_need, has_surplus) {
            (true, true) => ProductStatus::RebalanceCandidate,
            (true, false) => ProductStatus::NeedOnly,
            (false, true) => ProductStatus::SurplusOnly,
            (false, false) => ProductStatus::Ok,
        };

        ClassifiedArticle {
            product_id: article.product_id().clone(),
            info: article.info().clone(),
            status,
            locations: classified,
        }
    }
}
