//! Random stock snapshots for stress tests, benches and the CLI.

use crate::core::location::LocationId;
use crate::core::product::{ProductId, ProductInfo};
use crate::core::stock_row::{LocationStockRow, StockSnapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CATEGORIES: [(&str, &str); 6] = [
    ("Robes", "Été"),
    ("Robes", "Hiver"),
    ("Hauts", "Chemises"),
    ("Hauts", "T-shirts"),
    ("Accessoires", "Sacs"),
    ("", ""),
];

/// Parameters of a generated snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    pub location_count: usize,
    pub product_count: usize,
    /// Probability that a location reports a given product.
    pub coverage: f64,
    pub max_physical: u64,
    pub max_stock_min: u64,
    /// Maximum gap between a location's minimum and maximum.
    pub max_ceiling_span: u64,
    /// Probability that a reported row has no ceiling (`stock_max == 0`).
    pub no_ceiling_rate: f64,
    pub max_sales: u64,
    /// Probability that a reported row is emitted twice.
    pub duplicate_rate: f64,
    /// Probability that a reported row has a blank product identifier.
    pub blank_id_rate: f64,
    /// Fixed seed for reproducible output; random when `None`.
    pub seed: Option<u64>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            location_count: 5,
            product_count: 100,
            coverage: 0.8,
            max_physical: 30,
            max_stock_min: 8,
            max_ceiling_span: 12,
            no_ceiling_rate: 0.1,
            max_sales: 20,
            duplicate_rate: 0.0,
            blank_id_rate: 0.0,
            seed: None,
        }
    }
}

/// Generate a snapshot, seeded from `config.seed` when set.
pub fn generate_snapshot(config: &SnapshotConfig) -> StockSnapshot {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generate_snapshot_with(&mut rng, config)
}

/// Generate a snapshot from a caller-supplied random source.
pub fn generate_snapshot_with<R: Rng>(rng: &mut R, config: &SnapshotConfig) -> StockSnapshot {
    let locations: Vec<LocationId> = (0..config.location_count)
        .map(|i| LocationId::new(format!("LOC-{:02}", i)))
        .collect();
    let coverage = config.coverage.clamp(0.0, 1.0);
    let no_ceiling = config.no_ceiling_rate.clamp(0.0, 1.0);
    let duplicate = config.duplicate_rate.clamp(0.0, 1.0);
    let blank = config.blank_id_rate.clamp(0.0, 1.0);

    let mut snapshot = StockSnapshot::new();
    for p in 0..config.product_count {
        let (primary, sub) = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
        let info = ProductInfo::new(format!("Article {}", p))
            .with_brand(format!("Brand {}", p % 7))
            .with_categories(primary, sub);
        let id = ProductId::new(format!("P{:06}", p));

        for location in &locations {
            if !rng.gen_bool(coverage) {
                continue;
            }
            let stock_min = rng.gen_range(0..=config.max_stock_min);
            let stock_max = if rng.gen_bool(no_ceiling) {
                0
            } else {
                stock_min + rng.gen_range(0..=config.max_ceiling_span)
            };
            let product_id = if rng.gen_bool(blank) {
                ProductId::new("")
            } else {
                id.clone()
            };

            let row = LocationStockRow::new(
                product_id,
                location.clone(),
                rng.gen_range(0..=config.max_physical),
                stock_min,
                stock_max,
            )
            .with_sales(rng.gen_range(0..=config.max_sales))
            .with_info(info.clone());

            if rng.gen_bool(duplicate) {
                let mut repeat = row.clone();
                repeat.physical = rng.gen_range(0..=config.max_physical);
                snapshot.add(row);
                snapshot.add(repeat);
            } else {
                snapshot.add(row);
            }
        }
    }
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::pipeline::RebalanceEngine;

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let config = SnapshotConfig {
            seed: Some(42),
            ..Default::default()
        };
        let a = generate_snapshot(&config);
        let b = generate_snapshot(&config);
        assert_eq!(a.rows(), b.rows());
        assert!(!a.is_empty());
    }

    #[test]
    fn test_full_coverage_row_count() {
        let config = SnapshotConfig {
            location_count: 4,
            product_count: 10,
            coverage: 1.0,
            seed: Some(1),
            ..Default::default()
        };
        let snapshot = generate_snapshot(&config);
        assert_eq!(snapshot.len(), 40);
        assert_eq!(snapshot.locations().len(), 4);
        assert_eq!(snapshot.duplicate_count(), 0);
    }

    #[test]
    fn test_injected_defects_survive_pipeline() {
        let config = SnapshotConfig {
            location_count: 6,
            product_count: 200,
            duplicate_rate: 0.2,
            blank_id_rate: 0.1,
            seed: Some(7),
            ..Default::default()
        };
        let snapshot = generate_snapshot(&config);
        assert!(snapshot.duplicate_count() > 0);

        let result = RebalanceEngine::default().run(&snapshot).unwrap();
        assert!(result.report().unidentifiable_rows > 0);
        assert!(result.report().duplicate_rows() > 0);
        assert!(result.recommendations().iter().all(|r| r.quantity() > 0));
    }
}
