use crate::core::location::{LocationId, LocationSet};
use crate::core::product::ProductId;
use crate::core::transfer::TransferRecommendation;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Outbound and inbound totals of one location across all recommendations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSummary {
    pub location: LocationId,
    /// Distinct products this location sends.
    pub products_sent: usize,
    pub units_sent: u64,
    /// Distinct products this location receives.
    pub products_received: usize,
    pub units_received: u64,
}

impl LocationSummary {
    pub fn is_idle(&self) -> bool {
        self.units_sent == 0 && self.units_received == 0
    }
}

#[derive(Default)]
struct Flow<'a> {
    products: HashSet<&'a ProductId>,
    units: u64,
}

impl<'a> Flow<'a> {
    fn add(&mut self, rec: &'a TransferRecommendation) {
        self.products.insert(rec.product_id());
        self.units = self.units.saturating_add(rec.quantity());
    }
}

/// Rolls recommendations up into one summary per location.
pub struct SummaryAggregator;

impl SummaryAggregator {
    /// Summarize recommendations for every known location, in location order.
    ///
    /// Locations without any activity get all-zero figures. The
    /// recommendations are treated as an unordered multiset; endpoints
    /// outside the location set are not reported.
    pub fn summarize(
        recommendations: &[TransferRecommendation],
        locations: &LocationSet,
    ) -> Vec<LocationSummary> {
        let mut outbound: Vec<Flow> = locations.iter().map(|_| Flow::default()).collect();
        let mut inbound: Vec<Flow> = locations.iter().map(|_| Flow::default()).collect();

        for rec in recommendations {
            if let Some(i) = locations.index_of(rec.source()) {
                outbound[i].add(rec);
            }
            if let Some(i) = locations.index_of(rec.destination()) {
                inbound[i].add(rec);
            }
        }

        locations
            .iter()
            .zip(outbound.iter().zip(&inbound))
            .map(|(location, (out, inc))| LocationSummary {
                location: location.clone(),
                products_sent: out.products.len(),
                units_sent: out.units,
                products_received: inc.products.len(),
                units_received: inc.units,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stock_row::LocationStock;

    fn rec(product: &str, from: &str, to: &str, quantity: u64) -> TransferRecommendation {
        TransferRecommendation::new(
            ProductId::new(product),
            "",
            LocationId::new(from),
            LocationId::new(to),
            quantity,
            LocationStock::default(),
            LocationStock::default(),
        )
    }

    fn locations() -> LocationSet {
        vec![LocationId::new("A"), LocationId::new("B"), LocationId::new("C")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_summary_basic() {
        let recs = vec![rec("X", "B", "A", 3)];
        let summary = SummaryAggregator::summarize(&recs, &locations());

        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].products_received, 1);
        assert_eq!(summary[0].units_received, 3);
        assert_eq!(summary[1].products_sent, 1);
        assert_eq!(summary[1].units_sent, 3);
        assert!(summary[2].is_idle());
    }

    #[test]
    fn test_distinct_products_counted_once() {
        let recs = vec![
            rec("X", "B", "A", 3),
            rec("X", "B", "C", 2),
            rec("Y", "B", "A", 1),
        ];
        let summary = SummaryAggregator::summarize(&recs, &locations());
        let b = &summary[1];
        assert_eq!(b.products_sent, 2);
        assert_eq!(b.units_sent, 6);
        assert_eq!(summary[0].products_received, 2);
        assert_eq!(summary[0].units_received, 4);
    }

    #[test]
    fn test_units_saturate() {
        let recs = vec![rec("X", "B", "A", u64::MAX), rec("Y", "B", "A", u64::MAX)];
        let summary = SummaryAggregator::summarize(&recs, &locations());
        assert_eq!(summary[1].units_sent, u64::MAX);
        assert_eq!(summary[0].units_received, u64::MAX);
        assert_eq!(summary[0].products_received, 2);
    }

    #[test]
    fn test_no_recommendations_lists_every_location() {
        let summary = SummaryAggregator::summarize(&[], &locations());
        assert_eq!(summary.len(), 3);
        assert!(summary.iter().all(|s| s.is_idle()));
    }
}
