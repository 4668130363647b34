use serde::{Deserialize, Serialize};
use std::fmt;

/// Barcode-derived identifier of an article, shared across all locations.
///
/// The identifier is stored trimmed; an identifier that is empty after
/// trimming cannot be attributed to any product.
///
/// # Examples
///
/// ```
/// use stock_rebalancer::core::product::ProductId;
///
/// let id = ProductId::new("  3760123456789 ");
/// assert_eq!(id.as_str(), "3760123456789");
/// assert!(ProductId::new("   ").is_blank());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.len() == id.len() {
            Self(id)
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the identifier is unusable as a product key.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Descriptive fields of an article. Any of them may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub label: String,
    pub brand: String,
    pub primary_category: String,
    pub sub_category: String,
}

impl ProductInfo {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_categories(
        mut self,
        primary: impl Into<String>,
        sub: impl Into<String>,
    ) -> Self {
        self.primary_category = primary.into();
        self.sub_category = sub.into();
        self
    }
}
