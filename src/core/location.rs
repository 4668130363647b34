use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of a retail location (shop or depot) reporting its own stock.
///
/// # Examples
///
/// ```
/// use stock_rebalancer::core::location::LocationId;
///
/// let paris = LocationId::new("PARIS-01");
/// let lyon = LocationId::new("LYON-02");
/// assert_ne!(paris, lyon);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(String);

impl LocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this location ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for LocationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The fixed, ordered set of locations known to a batch.
///
/// Iteration order is the tie-break order used by every stage of the
/// pipeline, so two runs over the same set always agree. Membership is
/// answered from a hash index kept alongside the ordered list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LocationId>", into = "Vec<LocationId>")]
pub struct LocationSet {
    locations: Vec<LocationId>,
    index: HashMap<LocationId, usize>,
}

impl LocationSet {
    /// Build a set preserving the given order; later repeats are ignored.
    pub fn new(locations: impl IntoIterator<Item = LocationId>) -> Self {
        let mut set = Self::default();
        for location in locations {
            set.insert(location);
        }
        set
    }

    /// Build a set sorted by identifier.
    pub fn sorted(locations: impl IntoIterator<Item = LocationId>) -> Self {
        let mut locations: Vec<LocationId> = locations.into_iter().collect();
        locations.sort();
        Self::new(locations)
    }

    /// Append a location if it is not already known. Returns `true` if added.
    pub fn insert(&mut self, location: LocationId) -> bool {
        if self.contains(&location) {
            return false;
        }
        self.index.insert(location.clone(), self.locations.len());
        self.locations.push(location);
        true
    }

    pub fn contains(&self, location: &LocationId) -> bool {
        self.index.contains_key(location)
    }

    /// Position of a location in iteration order.
    pub fn index_of(&self, location: &LocationId) -> Option<usize> {
        self.index.get(location).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LocationId> {
        self.locations.iter()
    }

    pub fn as_slice(&self) -> &[LocationId] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl<'a> IntoIterator for &'a LocationSet {
    type Item = &'a LocationId;
    type IntoIter = std::slice::Iter<'a, LocationId>;

    fn into_iter(self) -> Self::IntoIter {
        self.locations.iter()
    }
}

impl From<Vec<LocationId>> for LocationSet {
    fn from(locations: Vec<LocationId>) -> Self {
        Self::new(locations)
    }
}

impl From<LocationSet> for Vec<LocationId> {
    fn from(set: LocationSet) -> Self {
        set.locations
    }
}

impl FromIterator<LocationId> for LocationSet {
    fn from_iter<T: IntoIterator<Item = LocationId>>(iter: T) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_equality() {
        let a = LocationId::new("PARIS-01");
        let b = LocationId::new("PARIS-01");
        let c = LocationId::new("LYON-02");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_location_display() {
        let l = LocationId::new("NICE-03");
        assert_eq!(format!("{}", l), "NICE-03");
        assert_eq!(format!("[{:<8}]", l), "[NICE-03 ]");
    }

    #[test]
    fn test_set_preserves_first_occurrence_order() {
        let set = LocationSet::new(vec![
            LocationId::new("B"),
            LocationId::new("A"),
            LocationId::new("B"),
            LocationId::new("C"),
        ]);
        let names: Vec<&str> = set.iter().map(|l| l.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
        assert_eq!(set.index_of(&LocationId::new("C")), Some(2));
    }

    #[test]
    fn test_sorted_set_dedups() {
        let set = LocationSet::sorted(vec![
            LocationId::new("C"),
            LocationId::new("A"),
            LocationId::new("C"),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0].as_str(), "A");
        assert!(set.contains(&LocationId::new("C")));
        assert!(!set.contains(&LocationId::new("B")));
        assert_eq!(set.index_of(&LocationId::new("C")), Some(1));
    }

    #[test]
    fn test_set_serializes_as_ordered_list() {
        let set = LocationSet::new(vec![LocationId::new("B"), LocationId::new("A")]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["B","A"]"#);

        let back: LocationSet = serde_json::from_str(r#"["B","A","B"]"#).unwrap();
        assert_eq!(back, set);
        assert_eq!(back.index_of(&LocationId::new("A")), Some(1));
        assert!(back.contains(&LocationId::new("B")));
    }
}
