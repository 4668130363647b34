use crate::analysis::category::CategoryBreakdown;
use crate::analysis::classification::{ClassifiedArticle, ProductStatus, StockClassifier};
use crate::analysis::consolidation::{ConsolidatedArticle, ConsolidationReport, Consolidator};
use crate::core::config::RebalanceConfig;
use crate::core::error::RebalanceError;
use crate::core::location::LocationSet;
use crate::core::stock_row::{saturating_total, LocationStockRow, StockSnapshot};
use crate::core::transfer::TransferRecommendation;
use crate::optimization::allocation::TransferAllocator;
use crate::optimization::summary::{LocationSummary, SummaryAggregator};
use chrono::{DateTime, Utc};
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything a rebalancing run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceResult {
    run_id: Uuid,
    generated_at: DateTime<Utc>,
    source_floor: u64,
    locations: LocationSet,
    articles: Vec<ConsolidatedArticle>,
    classified: Vec<ClassifiedArticle>,
    recommendations: Vec<TransferRecommendation>,
    summaries: Vec<LocationSummary>,
    categories: CategoryBreakdown,
    report: ConsolidationReport,
}

impl RebalanceResult {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn source_floor(&self) -> u64 {
        self.source_floor
    }

    pub fn locations(&self) -> &LocationSet {
        &self.locations
    }

    /// Consolidated articles, sorted by product identifier.
    pub fn articles(&self) -> &[ConsolidatedArticle] {
        &self.articles
    }

    /// Classified articles, parallel to [`articles`](Self::articles).
    pub fn classified(&self) -> &[ClassifiedArticle] {
        &self.classified
    }

    /// Products with both NEED and SURPLUS locations.
    pub fn candidates(&self) -> impl Iterator<Item = &ClassifiedArticle> {
        self.classified.iter().filter(|a| a.is_rebalance_candidate())
    }

    /// Recommendations grouped by product in article order.
    pub fn recommendations(&self) -> &[TransferRecommendation] {
        &self.recommendations
    }

    pub fn summaries(&self) -> &[LocationSummary] {
        &self.summaries
    }

    pub fn categories(&self) -> &CategoryBreakdown {
        &self.categories
    }

    pub fn report(&self) -> &ConsolidationReport {
        &self.report
    }

    /// Number of products with the given status.
    pub fn count_with_status(&self, status: ProductStatus) -> usize {
        self.classified.iter().filter(|a| a.status() == status).count()
    }

    /// Total shortfall of the rebalance candidates.
    pub fn candidate_need(&self) -> u64 {
        saturating_total(self.candidates().map(|a| a.total_need()))
    }

    /// Total units recommended for transfer.
    pub fn units_recommended(&self) -> u64 {
        saturating_total(self.recommendations.iter().map(|r| r.quantity()))
    }

    /// Share of the candidates' need covered by recommendations.
    pub fn coverage_percent(&self) -> f64 {
        let need = self.candidate_need();
        if need == 0 {
            return 0.0;
        }
        self.units_recommended() as f64 * 100.0 / need as f64
    }
}

impl std::fmt::Display for RebalanceResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Rebalance Result ===")?;
        writeln!(f, "Run:             {}", self.run_id)?;
        writeln!(f, "Generated:       {}", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "Source floor:    {}", self.source_floor)?;
        writeln!(f, "Locations:       {}", self.locations.len())?;
        writeln!(f, "Articles:        {}", self.articles.len())?;
        writeln!(f, "  OK:                  {}", self.count_with_status(ProductStatus::Ok))?;
        writeln!(f, "  Need only:           {}", self.count_with_status(ProductStatus::NeedOnly))?;
        writeln!(f, "  Surplus only:        {}", self.count_with_status(ProductStatus::SurplusOnly))?;
        writeln!(
            f,
            "  Rebalance candidates: {}",
            self.count_with_status(ProductStatus::RebalanceCandidate)
        )?;
        writeln!(f, "Recommendations: {}", self.recommendations.len())?;
        writeln!(f, "Units to move:   {}", self.units_recommended())?;
        writeln!(f, "Need covered:    {:.1}%", self.coverage_percent())?;

        if !self.report.is_clean() {
            writeln!(f, "\nData quality:")?;
            writeln!(f, "  Rows without product id: {}", self.report.unidentifiable_rows)?;
            writeln!(f, "  Duplicate rows ignored:  {}", self.report.duplicate_rows())?;
        }

        writeln!(f, "\n--- Per Location ---")?;
        for s in &self.summaries {
            writeln!(
                f,
                "  {:<20} sends {:>4} product(s) / {:>6} unit(s), receives {:>4} product(s) / {:>6} unit(s)",
                s.location, s.products_sent, s.units_sent, s.products_received, s.units_received
            )?;
        }
        Ok(())
    }
}

/// Runs the whole pipeline: consolidate, classify, allocate, summarize.
///
/// Classification and allocation are independent per product, so they run
/// on a rayon pool when [`RebalanceConfig::parallel`] is set. Results are
/// collected in article order either way.
pub struct RebalanceEngine {
    config: RebalanceConfig,
}

impl Default for RebalanceEngine {
    fn default() -> Self {
        Self::new(RebalanceConfig::default())
    }
}

impl RebalanceEngine {
    pub fn new(config: RebalanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RebalanceConfig {
        &self.config
    }

    /// Run over a snapshot, using every location it names as the known set.
    pub fn run(&self, snapshot: &StockSnapshot) -> Result<RebalanceResult, RebalanceError> {
        self.run_with_locations(snapshot.rows(), &snapshot.locations())
    }

    /// Run over rows against a caller-supplied known-location set.
    pub fn run_with_locations(
        &self,
        rows: &[LocationStockRow],
        locations: &LocationSet,
    ) -> Result<RebalanceResult, RebalanceError> {
        let consolidation = Consolidator::consolidate(rows, locations)?;
        let classifier = StockClassifier::from_config(&self.config);

        let per_product: Vec<(ClassifiedArticle, Vec<TransferRecommendation>)> =
            if self.config.parallel {
                consolidation
                    .articles
                    .par_iter()
                    .map(|article| analyze_product(&classifier, article, locations))
                    .collect()
            } else {
                consolidation
                    .articles
                    .iter()
                    .map(|article| analyze_product(&classifier, article, locations))
                    .collect()
            };

        let mut classified = Vec::with_capacity(per_product.len());
        let mut recommendations = Vec::new();
        for (article, recs) in per_product {
            classified.push(article);
            recommendations.extend(recs);
        }

        let candidates = classified.iter().filter(|a| a.is_rebalance_candidate()).count();
        info!(
            "{} rebalance candidate(s), {} recommendation(s)",
            candidates,
            recommendations.len()
        );

        let summaries = SummaryAggregator::summarize(&recommendations, locations);
        let categories = CategoryBreakdown::from_articles(&classified, locations);

        Ok(RebalanceResult {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            source_floor: classifier.source_floor(),
            locations: locations.clone(),
            articles: consolidation.articles,
            classified,
            recommendations,
            summaries,
            categories,
            report: consolidation.report,
        })
    }
}

fn analyze_product(
    classifier: &StockClassifier,
    article: &ConsolidatedArticle,
    locations: &LocationSet,
) -> (ClassifiedArticle, Vec<TransferRecommendation>) {
    let classified = classifier.classify(article, locations);
    let recommendations = TransferAllocator::allocate(&classified);
    (classified, recommendations)
}
