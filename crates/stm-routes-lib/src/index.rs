//! Route id to segment grouping

use std::collections::HashMap;

/// Ordered segment handles of every route, keyed by route id
///
/// Built once per load, in feature order, and discarded wholesale on the next load.
#[derive(Debug, Clone)]
pub struct RouteIndex<S> {
    routes: HashMap<String, Vec<S>>,
}

impl<S> Default for RouteIndex<S> {
    fn default() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }
}

impl<S> RouteIndex<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment to a route, creating the route on first use.
    ///
    /// Returns `false` (and drops nothing into the index) for an empty route id.
    pub fn add(&mut self, route_id: &str, segment: S) -> bool {
        if route_id.is_empty() {
            return false;
        }
        self.routes
            .entry(route_id.to_string())
            .or_default()
            .push(segment);
        true
    }

    /// Segments of a route in insertion order; empty for unknown routes
    #[inline]
    pub fn get(&self, route_id: &str) -> &[S] {
        self.routes.get(route_id).map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline]
    pub fn contains(&self, route_id: &str) -> bool {
        self.routes.contains_key(route_id)
    }

    pub fn clear(&mut self) {
        self.routes.clear();
    }

    #[inline]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Total number of indexed segments across all routes
    pub fn segment_count(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Route ids sorted for display, numeric ids in numeric order
    pub fn route_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        ids.sort_by(|a, b| match (a.parse::<u64>(), b.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        });
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_preserves_order() {
        let mut index = RouteIndex::new();
        index.add("10", 'a');
        index.add("24", 'b');
        index.add("10", 'c');

        assert_eq!(index.get("10"), &['a', 'c']);
        assert_eq!(index.get("24"), &['b']);
        assert_eq!(index.route_count(), 2);
        assert_eq!(index.segment_count(), 3);
    }

    #[test]
    fn test_empty_id_is_ignored() {
        let mut index = RouteIndex::new();
        assert!(!index.add("", 1));
        assert!(index.is_empty());
        assert!(index.get("").is_empty());
    }

    #[test]
    fn test_unknown_route_is_empty() {
        let index: RouteIndex<u32> = RouteIndex::new();
        assert!(index.get("747").is_empty());
        assert!(!index.contains("747"));
    }

    #[test]
    fn test_clear() {
        let mut index = RouteIndex::new();
        index.add("10", 1);
        index.clear();
        assert!(index.is_empty());
        assert!(index.get("10").is_empty());
    }

    #[test]
    fn test_route_ids_sorted() {
        let mut index = RouteIndex::new();
        for id in ["105", "24", "N1", "10", "A"] {
            index.add(id, ());
        }
        assert_eq!(index.route_ids(), vec!["10", "24", "105", "A", "N1"]);
    }
}
