use crate::analysis::classification::{ClassifiedArticle, ClassifiedLocation};
use crate::core::location::LocationId;
use crate::core::transfer::TransferRecommendation;
use log::debug;
use std::collections::HashMap;

/// Turns classified NEED/SURPLUS positions into transfer recommendations.
///
/// Uses a deterministic greedy bipartite matching. It makes no claim of
/// global optimality.
pub struct TransferAllocator;

impl TransferAllocator {
    /// Allocate surplus toward need for a single product.
    ///
    /// Products that are not rebalance candidates yield no recommendations.
    ///
    /// # Algorithm
    ///
    /// 1. Destinations: NEED locations by descending need.
    /// 2. Sources: SURPLUS locations by descending physical quantity
    ///    (not by surplus).
    /// 3. Each source starts with its transferable quantity available.
    /// 4. For each destination, walk the sources in order and take
    ///    `min(remaining need, remaining available)` from each until the
    ///    need is met, skipping the destination itself and exhausted sources.
    /// 5. A need no source can cover is left partially met.
    ///
    /// Both sorts are stable, so ties keep location-set order and repeated
    /// runs produce identical sequences.
    ///
    /// # Examples
    ///
    /// ```
    /// use stock_rebalancer::analysis::classification::StockClassifier;
    /// use stock_rebalancer::analysis::consolidation::ConsolidatedArticle;
    /// use stock_rebalancer::core::location::{LocationId, LocationSet};
    /// use stock_rebalancer::core::product::{ProductId, ProductInfo};
    /// use stock_rebalancer::core::stock_row::LocationStock;
    /// use stock_rebalancer::optimization::allocation::TransferAllocator;
    ///
    /// let a = LocationId::new("A");
    /// let b = LocationId::new("B");
    /// let locations: LocationSet = vec![a.clone(), b.clone()].into_iter().collect();
    /// let article = ConsolidatedArticle::new(
    ///     ProductId::new("X"),
    ///     ProductInfo::new("Robe lin"),
    ///     vec![
    ///         (a.clone(), LocationStock::new(2, 5, 10)),
    ///         (b.clone(), LocationStock::new(15, 5, 10)),
    ///     ],
    /// );
    /// let classified = StockClassifier::new(1).classify(&article, &locations);
    ///
    /// let recs = TransferAllocator::allocate(&classified);
    /// assert_eq!(recs.len(), 1);
    /// assert_eq!(recs[0].source(), &b);
    /// assert_eq!(recs[0].destination(), &a);
    /// assert_eq!(recs[0].quantity(), 3);
    /// ```
    pub fn allocate(article: &ClassifiedArticle) -> Vec<TransferRecommendation> {
        if !article.is_rebalance_candidate() {
            return Vec::new();
        }

        let mut destinations: Vec<&ClassifiedLocation> = article.needs().collect();
        destinations.sort_by(|a, b| b.position.need_qty().cmp(&a.position.need_qty()));

        let mut sources: Vec<&ClassifiedLocation> = article.surpluses().collect();
        sources.sort_by(|a, b| b.stock.physical.cmp(&a.stock.physical));

        // Scoped to this call; never shared across products.
        let mut remaining: HashMap<&LocationId, u64> = sources
            .iter()
            .map(|s| (&s.location, s.position.surplus_qty()))
            .collect();

        let mut recommendations = Vec::new();
        for dest in &destinations {
            let mut need = dest.position.need_qty();

            for src in &sources {
                if need == 0 {
                    break;
                }
                if src.location == dest.location {
                    continue;
                }
                let available = remaining.get(&src.location).copied().unwrap_or(0);
                if available == 0 {
                    continue;
                }

                let quantity = need.min(available);
                recommendations.push(TransferRecommendation::new(
                    article.product_id().clone(),
                    article.label(),
                    src.location.clone(),
                    dest.location.clone(),
                    quantity,
                    src.stock,
                    dest.stock,
                ));
                need -= quantity;
                remaining.insert(&src.location, available - quantity);
            }

            if need > 0 {
                debug!(
                    "product {}: need at {} left {} of {} unmet",
                    article.product_id(),
                    dest.location,
                    need,
                    dest.position.need_qty()
                );
            }
        }

        recommendations
    }
}
