use approx::assert_relative_eq;
use std::fs;
use std::io::Write;
use stock_rebalancer::analysis::classification::{LocationPosition, ProductStatus};
use stock_rebalancer::core::config::RebalanceConfig;
use stock_rebalancer::core::error::RebalanceError;
use stock_rebalancer::core::location::{LocationId, LocationSet};
use stock_rebalancer::core::product::{ProductId, ProductInfo};
use stock_rebalancer::core::stock_row::{LocationStockRow, StockSnapshot};
use stock_rebalancer::io::loader::StockLoader;
use stock_rebalancer::io::tables::{all_tables, recommendations_table, Cell};
use stock_rebalancer::io::writer::{ResultWriter, REPORT_FILE};
use stock_rebalancer::optimization::pipeline::RebalanceEngine;
use tempfile::TempDir;

fn row(product: &str, location: &str, physical: u64, min: u64, max: u64) -> LocationStockRow {
    LocationStockRow::new(
        ProductId::new(product),
        LocationId::new(location),
        physical,
        min,
        max,
    )
}

/// Two shops, one dress: the short shop receives exactly its shortfall.
#[test]
fn two_location_transfer_scenario() {
    let snapshot: StockSnapshot = vec![
        row("X", "A", 2, 5, 10).with_label("Robe lin"),
        row("X", "B", 15, 5, 10).with_label("Robe lin"),
    ]
    .into_iter()
    .collect();

    let result = RebalanceEngine::default().run(&snapshot).unwrap();

    let article = &result.classified()[0];
    assert_eq!(article.status(), ProductStatus::RebalanceCandidate);
    let a = article.position(&LocationId::new("A")).unwrap();
    assert_eq!(a.position, LocationPosition::Need { need_qty: 3 });
    let b = article.position(&LocationId::new("B")).unwrap();
    assert_eq!(
        b.position,
        LocationPosition::Surplus {
            excess_qty: 5,
            available_qty: 10,
            transferable_qty: 5,
        }
    );

    let recs = result.recommendations();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].product_id().as_str(), "X");
    assert_eq!(recs[0].source().as_str(), "B");
    assert_eq!(recs[0].destination().as_str(), "A");
    assert_eq!(recs[0].quantity(), 3);

    let summaries = result.summaries();
    assert_eq!(summaries[0].location.as_str(), "A");
    assert_eq!((summaries[0].products_received, summaries[0].units_received), (1, 3));
    assert_eq!((summaries[0].products_sent, summaries[0].units_sent), (0, 0));
    assert_eq!(summaries[1].location.as_str(), "B");
    assert_eq!((summaries[1].products_sent, summaries[1].units_sent), (1, 3));
}

/// A location with no ceiling never donates, however much it holds.
#[test]
fn no_ceiling_location_never_donates() {
    let snapshot: StockSnapshot = vec![row("X", "A", 0, 5, 10), row("X", "C", 50, 5, 0)]
        .into_iter()
        .collect();

    let result = RebalanceEngine::default().run(&snapshot).unwrap();
    let c = result.classified()[0]
        .position(&LocationId::new("C"))
        .unwrap();
    assert_eq!(c.position, LocationPosition::Ok);
    assert_eq!(result.classified()[0].status(), ProductStatus::NeedOnly);
    assert!(result.recommendations().is_empty());
}

/// A need larger than all available surplus is partly met without error.
#[test]
fn partial_fulfillment_leaves_need_unmet() {
    let snapshot: StockSnapshot = vec![row("X", "A", 0, 10, 20), row("X", "B", 14, 1, 10)]
        .into_iter()
        .collect();

    let result = RebalanceEngine::default().run(&snapshot).unwrap();
    assert_eq!(result.recommendations().len(), 1);
    assert_eq!(result.recommendations()[0].quantity(), 4);
    assert_eq!(result.candidate_need(), 10);
    assert_relative_eq!(result.coverage_percent(), 40.0);
}

#[test]
fn multi_product_multi_location() {
    let snapshot: StockSnapshot = vec![
        // X: two needs, two sources
        row("X", "Paris", 0, 6, 12),
        row("X", "Lyon", 3, 5, 10),
        row("X", "Nice", 25, 4, 10),
        row("X", "Lille", 18, 4, 14),
        // Y: need only
        row("Y", "Paris", 1, 3, 6),
        row("Y", "Lyon", 4, 3, 6),
        // Z: surplus only
        row("Z", "Nice", 40, 2, 8),
    ]
    .into_iter()
    .collect();

    let result = RebalanceEngine::default().run(&snapshot).unwrap();

    assert_eq!(result.locations().len(), 4);
    assert_eq!(result.count_with_status(ProductStatus::RebalanceCandidate), 1);
    assert_eq!(result.count_with_status(ProductStatus::NeedOnly), 1);
    assert_eq!(result.count_with_status(ProductStatus::SurplusOnly), 1);

    // Paris needs 6, Lyon needs 2. Nice (25 on hand) gives 15 max, Lille 4.
    let triples: Vec<(String, String, u64)> = result
        .recommendations()
        .iter()
        .map(|r| (r.source().to_string(), r.destination().to_string(), r.quantity()))
        .collect();
    assert_eq!(
        triples,
        vec![
            ("Nice".to_string(), "Paris".to_string(), 6),
            ("Nice".to_string(), "Lyon".to_string(), 2),
        ]
    );
    assert_relative_eq!(result.coverage_percent(), 100.0);

    let sent: u64 = result.summaries().iter().map(|s| s.units_sent).sum();
    let received: u64 = result.summaries().iter().map(|s| s.units_received).sum();
    assert_eq!(sent, 8);
    assert_eq!(received, 8);
}

#[test]
fn empty_input_yields_empty_tables() {
    let result = RebalanceEngine::default().run(&StockSnapshot::new()).unwrap();
    assert!(result.articles().is_empty());
    for table in all_tables(&result) {
        assert!(table.is_empty());
        assert!(!table.headers().is_empty());
    }
}

#[test]
fn no_candidates_still_summarizes_every_location() {
    let snapshot: StockSnapshot = vec![
        row("X", "A", 6, 5, 10),
        row("X", "B", 7, 5, 10),
        row("Y", "C", 1, 3, 6),
    ]
    .into_iter()
    .collect();

    let result = RebalanceEngine::default().run(&snapshot).unwrap();
    assert!(result.recommendations().is_empty());
    assert_eq!(result.summaries().len(), 3);
    assert!(result.summaries().iter().all(|s| s.is_idle()));
    assert!(recommendations_table(&result).is_empty());
}

#[test]
fn data_quality_issues_are_reported_not_fatal() {
    let snapshot: StockSnapshot = vec![
        row("X", "A", 2, 5, 10),
        row("X", "A", 40, 5, 10),
        row("  ", "B", 3, 1, 2),
        row("X", "B", 15, 5, 10),
    ]
    .into_iter()
    .collect();

    let result = RebalanceEngine::default().run(&snapshot).unwrap();
    assert_eq!(result.report().unidentifiable_rows, 1);
    assert_eq!(result.report().duplicate_rows(), 1);
    // first A row wins; the duplicate still counts toward the total
    assert_eq!(result.articles()[0].stock(&LocationId::new("A")).physical, 2);
    assert_eq!(result.articles()[0].total_physical(), 57);
    assert_eq!(result.units_recommended(), 3);
}

#[test]
fn empty_location_set_with_data_is_rejected() {
    let rows = vec![row("X", "A", 2, 5, 10)];
    let err = RebalanceEngine::default()
        .run_with_locations(&rows, &LocationSet::default())
        .unwrap_err();
    assert_eq!(err, RebalanceError::EmptyLocationSet { article_count: 1 });
}

#[test]
fn caller_supplied_location_order_is_respected() {
    let rows = vec![row("X", "A", 0, 2, 10), row("X", "B", 0, 2, 10), row("X", "C", 13, 1, 10)];
    let locations: LocationSet = vec![LocationId::new("C"), LocationId::new("B"), LocationId::new("A")]
        .into_iter()
        .collect();

    let result = RebalanceEngine::default()
        .run_with_locations(&rows, &locations)
        .unwrap();

    // equal needs: B precedes A in the supplied order
    assert_eq!(result.recommendations()[0].destination().as_str(), "B");
    assert_eq!(result.recommendations()[1].destination().as_str(), "A");
    assert_eq!(result.summaries()[0].location.as_str(), "C");
}

/// Two exports on disk → load → rebalance → write result files.
#[test]
fn csv_exports_end_to_end() {
    let input = TempDir::new().unwrap();
    let header = "Code-barres article,Libellé article,Dépôt,Physique,Ventes FO,Stock minimum,Stock maximum,MARQUE,CATEGORIE PRINCIPALE,SOUS-CATEGORIE";

    let mut paris = fs::File::create(input.path().join("stock_paris.csv")).unwrap();
    writeln!(paris, "{}", header).unwrap();
    writeln!(paris, "3700001,Robe lin,Paris,2,6,5,10,Maison,Robes,Été").unwrap();
    writeln!(paris, "3700002,Sac cuir,Paris,1,0,2,4,Maison,Accessoires,Sacs").unwrap();

    let mut lyon = fs::File::create(input.path().join("stock_lyon.csv")).unwrap();
    writeln!(lyon, "{}", header).unwrap();
    writeln!(lyon, "3700001,Robe lin,Lyon,15,1,5,10,Maison,Robes,Été").unwrap();
    writeln!(lyon, "3700002,Sac cuir,Lyon,abc,0,2,4,Maison,Accessoires,Sacs").unwrap();
    drop((paris, lyon));

    let config = RebalanceConfig::default();
    let (snapshot, load_report) = StockLoader::new(&config).load(input.path()).unwrap();
    assert_eq!(load_report.files_read.len(), 2);
    assert_eq!(snapshot.len(), 4);

    let result = RebalanceEngine::new(config).run(&snapshot).unwrap();
    assert_eq!(result.recommendations().len(), 1);
    let rec = &result.recommendations()[0];
    assert_eq!(rec.product_id().as_str(), "3700001");
    assert_eq!(rec.label(), "Robe lin");
    assert_eq!(rec.quantity(), 3);
    assert_eq!(rec.destination_stock().sales, 6);

    let table = recommendations_table(&result);
    assert_eq!(table.cell(0, "Source"), Some(&Cell::from("Lyon")));

    let output = TempDir::new().unwrap();
    let writer = ResultWriter::new(output.path()).unwrap();
    let written = writer.write_all(&result, Some(&load_report)).unwrap();
    assert_eq!(written.len(), 7);

    let summary = fs::read_to_string(output.path().join("summary.csv")).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines[0], "Location,Products To Send,Units To Send,Products To Receive,Units To Receive");
    assert_eq!(lines[1], "Lyon,1,3,0,0");
    assert_eq!(lines[2], "Paris,0,0,1,3");

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.path().join(REPORT_FILE)).unwrap())
            .unwrap();
    assert_eq!(report["rebalance_candidates"], 1);
    assert_eq!(report["load"]["rows_loaded"], 4);

    let combined = writer
        .write_snapshot(&snapshot, &RebalanceConfig::default().columns)
        .unwrap();
    let combined = fs::read_to_string(combined).unwrap();
    let lines: Vec<&str> = combined.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].ends_with(",Source"));
    assert!(lines[1].starts_with("3700001,Robe lin,Lyon,15,"));
    assert!(lines[1].ends_with(",stock_lyon.csv"));
    assert!(lines[4].ends_with(",stock_paris.csv"));
}

#[test]
fn source_floor_override_changes_allocation() {
    let snapshot: StockSnapshot = vec![row("X", "A", 0, 8, 10), row("X", "B", 9, 0, 3)]
        .into_iter()
        .collect();

    // floor 1: B keeps 1, gives min(8, 6) = 6
    let loose = RebalanceEngine::default().run(&snapshot).unwrap();
    assert_eq!(loose.units_recommended(), 6);

    // floor 5: B keeps 5, gives 4
    let strict = RebalanceEngine::new(RebalanceConfig::default().with_source_floor(5))
        .run(&snapshot)
        .unwrap();
    assert_eq!(strict.units_recommended(), 4);
}

#[test]
fn category_breakdown_from_pipeline() {
    let dresses = ProductInfo::new("Robe").with_categories("Robes", "Été");
    let snapshot: StockSnapshot = vec![
        row("X", "A", 2, 5, 10).with_info(dresses.clone()),
        row("X", "B", 15, 5, 10).with_info(dresses),
        row("Y", "A", 6, 5, 10),
    ]
    .into_iter()
    .collect();

    let result = RebalanceEngine::default().run(&snapshot).unwrap();
    let categories = result.categories().categories();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].primary_category, "Robes");
    assert_eq!(categories[0].counts.need, 1);
    assert_eq!(categories[0].counts.surplus, 1);
    assert_eq!(categories[1].primary_category, "Uncategorized");
    // Y is OK at A and unreported (zero figures, OK) at B
    assert_eq!(categories[1].counts.ok, 2);

    let families = result.categories().families();
    assert_eq!(families.len(), 2);
    assert_eq!(families[0].primary_category, "Robes");
    assert!(families[0].sub_category.is_none());
    assert_eq!(families[0].counts, categories[0].counts);
}
