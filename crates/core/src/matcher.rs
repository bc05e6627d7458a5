//! Account catalog and the hierarchical-path suggestion matcher.
//!
//! A query like `fo:r` is split on `:` and every part must prefix some
//! segment of a candidate path, case-insensitively.  Candidates where the
//! parts line up left to right rank ahead of those that only match out of
//! order; each group is sorted lexicographically.

use std::collections::HashSet;

pub const SEPARATOR: char = ':';

/// Set of valid account paths, in server order.  Replaced wholesale on every
/// queue load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<String>,
}

impl Catalog {
    /// Duplicates are dropped, keeping the first occurrence.
    pub fn new(entries: impl IntoIterator<Item = String>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.clone()))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchKind {
    InOrder,
    OutOfOrder,
}

/// Rank `catalog` against `query`.  An empty query returns the catalog as is.
pub fn filter(query: &str, catalog: &Catalog) -> Vec<String> {
    let parts = query_parts(query);
    if parts.is_empty() {
        return catalog.entries().to_vec();
    }

    let mut in_order = Vec::new();
    let mut out_of_order = Vec::new();
    for entry in catalog.entries() {
        let segments = entry
            .split(SEPARATOR)
            .map(str::to_lowercase)
            .collect::<Vec<_>>();
        match classify(&parts, &segments) {
            Some(MatchKind::InOrder) => in_order.push(entry.clone()),
            Some(MatchKind::OutOfOrder) => out_of_order.push(entry.clone()),
            None => {}
        }
    }

    in_order.sort();
    out_of_order.sort();
    in_order.extend(out_of_order);
    in_order
}

fn query_parts(query: &str) -> Vec<String> {
    query
        .split(SEPARATOR)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn classify(parts: &[String], segments: &[String]) -> Option<MatchKind> {
    let every_part_found = parts
        .iter()
        .all(|part| segments.iter().any(|segment| segment.starts_with(part.as_str())));
    if !every_part_found {
        return None;
    }
    if matches_in_order(parts, segments) {
        Some(MatchKind::InOrder)
    } else {
        Some(MatchKind::OutOfOrder)
    }
}

/// Greedy left-to-right scan.  The position never moves backwards, but a
/// segment may satisfy consecutive parts.
fn matches_in_order(parts: &[String], segments: &[String]) -> bool {
    let mut position = 0;
    for part in parts {
        match segments[position..]
            .iter()
            .position(|segment| segment.starts_with(part.as_str()))
        {
            Some(offset) => position += offset,
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(entries: &[&str]) -> Catalog {
        Catalog::new(entries.iter().map(|e| e.to_string()))
    }

    fn sample() -> Catalog {
        catalog(&[
            "Expenses:Food:Restaurant",
            "Expenses:Food:Grocery",
            "Expenses:Transport:Taxi",
        ])
    }

    #[test]
    fn empty_query_returns_catalog_in_original_order() {
        let cat = catalog(&["Zeta:B", "Alpha:A", "Mid:C"]);
        assert_eq!(filter("", &cat), cat.entries());
        assert_eq!(filter(" : :", &cat), cat.entries());
    }

    #[test]
    fn two_part_query_matches_only_food_restaurant() {
        assert_eq!(filter("fo:r", &sample()), vec!["Expenses:Food:Restaurant"]);
    }

    #[test]
    fn single_part_query_sorts_lexicographically() {
        assert_eq!(
            filter("ex", &sample()),
            vec![
                "Expenses:Food:Grocery",
                "Expenses:Food:Restaurant",
                "Expenses:Transport:Taxi",
            ]
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(filter("TAXI", &sample()), vec!["Expenses:Transport:Taxi"]);
        assert_eq!(filter("eXp:TrA", &sample()), vec!["Expenses:Transport:Taxi"]);
    }

    #[test]
    fn every_part_must_match_some_segment() {
        assert!(filter("food:bus", &sample()).is_empty());
        assert!(filter("oo", &sample()).is_empty(), "prefix, not substring");
    }

    #[test]
    fn leading_and_trailing_separators_are_ignored() {
        assert_eq!(filter(":taxi:", &sample()), vec!["Expenses:Transport:Taxi"]);
        assert_eq!(filter("fo: :r", &sample()), vec!["Expenses:Food:Restaurant"]);
    }

    #[test]
    fn in_order_matches_rank_before_out_of_order() {
        let cat = catalog(&[
            "Assets:Bank:Checking",
            "Expenses:Bank:Fees",
            "Bank:Assets:Legacy",
        ]);
        // "as:ba" lines up left to right in Assets:Bank:Checking only; the
        // legacy account has both segments but in the opposite order.
        assert_eq!(
            filter("as:ba", &cat),
            vec!["Assets:Bank:Checking", "Bank:Assets:Legacy"]
        );
        assert_eq!(
            filter("ba:as", &cat),
            vec!["Bank:Assets:Legacy", "Assets:Bank:Checking"]
        );
    }

    #[test]
    fn segment_may_satisfy_several_parts() {
        let cat = catalog(&["Expenses:Food", "Food:Expenses:Other"]);
        // "fo:f" reuses the Food segment in both entries; both count as in order.
        assert_eq!(
            filter("fo:f", &cat),
            vec!["Expenses:Food", "Food:Expenses:Other"]
        );
    }

    #[test]
    fn buckets_sort_case_sensitively() {
        let cat = catalog(&["expenses:misc", "Expenses:Misc", "Expenses:Meals"]);
        assert_eq!(
            filter("m", &cat),
            vec!["Expenses:Meals", "Expenses:Misc", "expenses:misc"]
        );
    }

    #[test]
    fn results_are_sound_for_every_query_part() {
        let cat = catalog(&[
            "Assets:Checking",
            "Expenses:Food:Restaurant",
            "Expenses:Home:Rent",
            "Income:Salary",
            "Liabilities:CreditCard",
        ]);
        for query in ["e", "e:r", "r:e", "in:sa", "c", "li:cr:x", "HOME"] {
            let parts = query_parts(query);
            for entry in filter(query, &cat) {
                let segments = entry
                    .split(SEPARATOR)
                    .map(str::to_lowercase)
                    .collect::<Vec<_>>();
                for part in &parts {
                    assert!(
                        segments.iter().any(|s| s.starts_with(part.as_str())),
                        "{entry} returned for {query} without a segment starting with {part}"
                    );
                }
            }
        }
    }

    #[test]
    fn catalog_drops_duplicates_keeping_first() {
        let cat = catalog(&["B", "A", "B"]);
        assert_eq!(cat.entries(), ["B", "A"]);
        assert_eq!(cat.len(), 2);
    }
}
