//! Basic rebalancing example.
//!
//! Three shops report their stock of two articles. The engine finds where
//! each article is short and where it is overstocked, and proposes moves.

use stock_rebalancer::prelude::*;

fn row(product: &str, label: &str, location: &str, physical: u64, min: u64, max: u64) -> LocationStockRow {
    LocationStockRow::new(
        ProductId::new(product),
        LocationId::new(location),
        physical,
        min,
        max,
    )
    .with_label(label)
}

fn main() {
    println!("╔════════════════════════════════════════════╗");
    println!("║  stock-rebalancer: Basic Rebalance Example ║");
    println!("╚════════════════════════════════════════════╝\n");

    let snapshot: StockSnapshot = vec![
        row("3700001", "Robe lin", "Paris", 2, 5, 10),
        row("3700001", "Robe lin", "Lyon", 15, 5, 10),
        row("3700001", "Robe lin", "Nice", 6, 5, 10),
        row("3700002", "Sac cuir", "Paris", 9, 2, 4),
        row("3700002", "Sac cuir", "Lyon", 0, 3, 6),
        row("3700002", "Sac cuir", "Nice", 1, 2, 0),
    ]
    .into_iter()
    .collect();

    let result = match RebalanceEngine::default().run(&snapshot) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    println!("{}", result);

    println!("━━━ Positions ━━━\n");
    for article in result.classified() {
        println!("  {} ({}) [{}]", article.product_id(), article.label(), article.status());
        for loc in article.locations() {
            println!(
                "    {:<8} physical {:>3}  min {:>3}  max {:>3}  → {}",
                loc.location, loc.stock.physical, loc.stock.stock_min, loc.stock.stock_max, loc.position
            );
        }
    }

    println!("\n━━━ Recommendations ━━━\n");
    for rec in result.recommendations() {
        println!("  {}", rec);
    }
}
