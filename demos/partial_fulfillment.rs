//! Partial fulfillment example.
//!
//! One shop needs ten units but the only donor can spare four. The need is
//! partly covered and the shortfall is simply left unrecommended. The same
//! snapshot is then rerun with a stricter source floor.

use stock_rebalancer::prelude::*;

fn main() {
    println!("╔═══════════════════════════════════════════════════╗");
    println!("║  stock-rebalancer: Partial Fulfillment Example    ║");
    println!("╚═══════════════════════════════════════════════════╝\n");

    let snapshot: StockSnapshot = vec![
        LocationStockRow::new(ProductId::new("X"), LocationId::new("A"), 0, 10, 20)
            .with_label("Chemise oxford"),
        LocationStockRow::new(ProductId::new("X"), LocationId::new("B"), 14, 1, 10)
            .with_label("Chemise oxford"),
    ]
    .into_iter()
    .collect();

    for floor in [1, 12] {
        let engine = RebalanceEngine::new(RebalanceConfig::default().with_source_floor(floor));
        println!("━━━ Source floor {} ━━━\n", engine.config().source_floor);

        let result = match engine.run(&snapshot) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Error: {}", e);
                return;
            }
        };

        for rec in result.recommendations() {
            println!("  {}", rec);
        }
        println!(
            "  Need {} unit(s), recommended {} ({:.0}% covered)\n",
            result.candidate_need(),
            result.units_recommended(),
            result.coverage_percent()
        );
    }
}
