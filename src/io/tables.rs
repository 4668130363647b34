//! Flat tables built from a [`RebalanceResult`], ready for persistence.
//!
//! Per-location figures become one column per known location, in
//! location-set order. Every table keeps its headers when it has no rows.

use crate::analysis::category::CategoryStats;
use crate::core::stock_row::LocationStock;
use crate::optimization::pipeline::RebalanceResult;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CONSOLIDATED: &str = "consolidated";
pub const ANALYSIS: &str = "analysis";
pub const RECOMMENDATIONS: &str = "recommendations";
pub const SUMMARY: &str = "summary";
pub const CATEGORIES: &str = "categories";

/// A single table value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Int(u64),
    Text(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(n) => write!(f, "{}", n),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Cell {
    fn from(n: u64) -> Self {
        Cell::Int(n)
    }
}

impl From<usize> for Cell {
    fn from(n: usize) -> Self {
        Cell::Int(n as u64)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

/// Named table of rows sharing one header line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row.
    ///
    /// # Panics
    ///
    /// Panics if the row width differs from the header width.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        assert_eq!(
            row.len(),
            self.headers.len(),
            "Row width must match header width in table '{}'",
            self.name
        );
        self.rows.push(row);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Value at `row` under `header`, if both exist.
    pub fn cell(&self, row: usize, header: &str) -> Option<&Cell> {
        let column = self.column_index(header)?;
        self.rows.get(row).and_then(|r| r.get(column))
    }
}

fn headers(fixed: &[&str]) -> Vec<String> {
    fixed.iter().map(|h| h.to_string()).collect()
}

const DESCRIPTIVE: [&str; 7] = [
    "Product ID",
    "Label",
    "Brand",
    "Category",
    "Sub-category",
    "Total Physical",
    "Total Sales",
];

/// One row per article with the four stock figures of every location.
pub fn consolidated_table(result: &RebalanceResult) -> Table {
    let mut columns = headers(&DESCRIPTIVE);
    for location in result.locations() {
        columns.push(format!("{} - Physical", location));
        columns.push(format!("{} - Sales", location));
        columns.push(format!("{} - Min", location));
        columns.push(format!("{} - Max", location));
    }

    let mut table = Table::new(CONSOLIDATED, columns);
    for article in result.articles() {
        let info = article.info();
        let mut row: Vec<Cell> = vec![
            article.product_id().as_str().into(),
            info.label.as_str().into(),
            info.brand.as_str().into(),
            info.primary_category.as_str().into(),
            info.sub_category.as_str().into(),
            article.total_physical().into(),
            article.total_sales().into(),
        ];
        for location in result.locations() {
            let stock = article.stock(location);
            row.extend(stock_cells(&stock));
        }
        table.push_row(row);
    }
    table
}

fn stock_cells(stock: &LocationStock) -> [Cell; 4] {
    [
        stock.physical.into(),
        stock.sales.into(),
        stock.stock_min.into(),
        stock.stock_max.into(),
    ]
}

/// One row per article with its product status and every location's position.
pub fn analysis_table(result: &RebalanceResult) -> Table {
    let mut columns = headers(&DESCRIPTIVE);
    columns.push("Status".to_string());
    for location in result.locations() {
        columns.push(format!("{} - Status", location));
    }

    let mut table = Table::new(ANALYSIS, columns);
    for (article, classified) in result.articles().iter().zip(result.classified()) {
        let info = article.info();
        let mut row: Vec<Cell> = vec![
            article.product_id().as_str().into(),
            info.label.as_str().into(),
            info.brand.as_str().into(),
            info.primary_category.as_str().into(),
            info.sub_category.as_str().into(),
            article.total_physical().into(),
            article.total_sales().into(),
            classified.status().as_str().into(),
        ];
        for position in classified.locations() {
            row.push(position.position.to_string().into());
        }
        table.push_row(row);
    }
    table
}

/// One row per recommendation, with both ends' figures before the transfer.
pub fn recommendations_table(result: &RebalanceResult) -> Table {
    let mut table = Table::new(
        RECOMMENDATIONS,
        headers(&[
            "Product ID",
            "Label",
            "Source",
            "Destination",
            "Quantity",
            "Destination Sales",
            "Source Sales",
            "Destination Min",
            "Destination Max",
            "Destination Physical",
            "Source Min",
            "Source Max",
            "Source Physical",
        ]),
    );
    for rec in result.recommendations() {
        let src = rec.source_stock();
        let dst = rec.destination_stock();
        table.push_row(vec![
            rec.product_id().as_str().into(),
            rec.label().into(),
            rec.source().as_str().into(),
            rec.destination().as_str().into(),
            rec.quantity().into(),
            dst.sales.into(),
            src.sales.into(),
            dst.stock_min.into(),
            dst.stock_max.into(),
            dst.physical.into(),
            src.stock_min.into(),
            src.stock_max.into(),
            src.physical.into(),
        ]);
    }
    table
}

/// One row per known location, idle locations included.
pub fn summary_table(result: &RebalanceResult) -> Table {
    let mut table = Table::new(
        SUMMARY,
        headers(&[
            "Location",
            "Products To Send",
            "Units To Send",
            "Products To Receive",
            "Units To Receive",
        ]),
    );
    for s in result.summaries() {
        table.push_row(vec![
            s.location.as_str().into(),
            s.products_sent.into(),
            s.units_sent.into(),
            s.products_received.into(),
            s.units_received.into(),
        ]);
    }
    table
}

/// Status counts per family, each family row followed by its sub-categories.
///
/// Family rows leave "Sub-category" empty.
pub fn categories_table(result: &RebalanceResult) -> Table {
    let mut columns = headers(&["Category", "Sub-category", "Articles", "Need", "Surplus", "OK"]);
    for location in result.locations() {
        columns.push(format!("{} - Need", location));
        columns.push(format!("{} - Surplus", location));
    }

    let mut table = Table::new(CATEGORIES, columns);
    let breakdown = result.categories();
    for family in breakdown.families() {
        table.push_row(category_row(family, result));
        for stats in breakdown.sub_categories_of(&family.primary_category) {
            table.push_row(category_row(stats, result));
        }
    }
    table
}

fn category_row(stats: &CategoryStats, result: &RebalanceResult) -> Vec<Cell> {
    let mut row: Vec<Cell> = vec![
        stats.primary_category.as_str().into(),
        stats.sub_category.as_deref().unwrap_or("").into(),
        stats.article_count.into(),
        stats.counts.need.into(),
        stats.counts.surplus.into(),
        stats.counts.ok.into(),
    ];
    for location in result.locations() {
        let counts = stats.at(location);
        row.push(counts.need.into());
        row.push(counts.surplus.into());
    }
    row
}

/// Every output table, in writing order.
pub fn all_tables(result: &RebalanceResult) -> Vec<Table> {
    vec![
        consolidated_table(result),
        analysis_table(result),
        recommendations_table(result),
        summary_table(result),
        categories_table(result),
    ]
}
