//! Status counts rolled up by product category.
//!
//! Gives buyers a view of which families of articles are short or
//! overstocked, overall and per location. Two rollups are kept: one per
//! family (primary category alone, across all its sub-categories) and one
//! per (family, sub-category) pair.

use crate::analysis::classification::{ClassifiedArticle, LocationPosition};
use crate::core::location::{LocationId, LocationSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label used for articles without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Number of positions in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub need: usize,
    pub surplus: usize,
    pub ok: usize,
}

impl StatusCounts {
    fn record(&mut self, position: &LocationPosition) {
        match position {
            LocationPosition::Need { .. } => self.need += 1,
            LocationPosition::Surplus { .. } => self.surplus += 1,
            LocationPosition::Ok => self.ok += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.need + self.surplus + self.ok
    }
}

/// Counts for one family, or one (family, sub-category) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub primary_category: String,
    /// `None` on family rows, which cover every sub-category.
    pub sub_category: Option<String>,
    pub article_count: usize,
    pub counts: StatusCounts,
    /// Every known location, zero when no article of the category is there.
    pub per_location: BTreeMap<LocationId, StatusCounts>,
}

impl CategoryStats {
    fn empty(primary_category: String, sub_category: Option<String>, locations: &LocationSet) -> Self {
        Self {
            primary_category,
            sub_category,
            article_count: 0,
            counts: StatusCounts::default(),
            per_location: locations
                .iter()
                .map(|l| (l.clone(), StatusCounts::default()))
                .collect(),
        }
    }

    fn record(&mut self, article: &ClassifiedArticle) {
        self.article_count += 1;
        for classified in article.locations() {
            self.counts.record(&classified.position);
            self.per_location
                .entry(classified.location.clone())
                .or_default()
                .record(&classified.position);
        }
    }

    pub fn is_family(&self) -> bool {
        self.sub_category.is_none()
    }

    pub fn at(&self, location: &LocationId) -> StatusCounts {
        self.per_location.get(location).copied().unwrap_or_default()
    }
}

/// Category rollup over all classified articles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    families: Vec<CategoryStats>,
    categories: Vec<CategoryStats>,
}

impl CategoryBreakdown {
    /// Aggregate classified articles by family and by (family, sub-category),
    /// both sorted by name.
    pub fn from_articles(articles: &[ClassifiedArticle], locations: &LocationSet) -> Self {
        let mut families: BTreeMap<String, CategoryStats> = BTreeMap::new();
        let mut categories: BTreeMap<(String, String), CategoryStats> = BTreeMap::new();

        for article in articles {
            let primary = category_name(&article.info().primary_category);
            let sub = category_name(&article.info().sub_category);

            families
                .entry(primary.clone())
                .or_insert_with(|| CategoryStats::empty(primary.clone(), None, locations))
                .record(article);
            categories
                .entry((primary.clone(), sub.clone()))
                .or_insert_with(|| CategoryStats::empty(primary, Some(sub), locations))
                .record(article);
        }

        Self {
            families: families.into_values().collect(),
            categories: categories.into_values().collect(),
        }
    }

    /// One row per family.
    pub fn families(&self) -> &[CategoryStats] {
        &self.families
    }

    pub fn family(&self, primary_category: &str) -> Option<&CategoryStats> {
        self.families
            .iter()
            .find(|f| f.primary_category == primary_category)
    }

    /// Sub-category rows of one family.
    pub fn sub_categories_of<'a>(
        &'a self,
        primary_category: &'a str,
    ) -> impl Iterator<Item = &'a CategoryStats> + 'a {
        self.categories
            .iter()
            .filter(move |c| c.primary_category == primary_category)
    }

    /// One row per (family, sub-category) pair.
    pub fn categories(&self) -> &[CategoryStats] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn category_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNCATEGORIZED.to_string()
    } else {
        trimmed.to_string()
    }
}
