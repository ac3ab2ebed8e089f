//! Documents awaiting reduction and their greedy packing into groups.

use super::PartialResult;
use crate::tokens::{estimate_documents, estimate_tokens};
use std::ops::Range;

/// An ordered set of documents between collapse rounds.
///
/// A round never edits a set; it produces a new one from the combined groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseSet {
    documents: Vec<String>,
}

impl CollapseSet {
    pub fn new(documents: Vec<String>) -> Self {
        Self { documents }
    }

    /// Build the initial set from map outputs, ordered by source chunk.
    pub fn from_partials(mut partials: Vec<PartialResult>) -> Self {
        partials.sort_by_key(|p| p.source_chunk_index);
        Self::new(partials.into_iter().map(|p| p.text).collect())
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<String> {
        self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Estimated token cost of the whole set.
    pub fn tokens(&self) -> usize {
        estimate_documents(&self.documents)
    }

    pub fn fits(&self, budget: usize) -> bool {
        self.tokens() <= budget
    }

    /// Estimated cost of the most expensive single document.
    pub fn largest_document_tokens(&self) -> usize {
        self.documents
            .iter()
            .map(|d| estimate_tokens(d))
            .max()
            .unwrap_or(0)
    }

    /// Pack documents, in order, into maximal contiguous groups whose cost
    /// stays within `budget`. A document larger than the budget gets a group
    /// of its own.
    pub fn partition(&self, budget: usize) -> Vec<Range<usize>> {
        let mut groups = Vec::new();
        let mut start = 0;
        let mut used = 0;

        for (i, doc) in self.documents.iter().enumerate() {
            let cost = estimate_tokens(doc);
            if i > start && used + cost > budget {
                groups.push(start..i);
                start = i;
                used = 0;
            }
            used += cost;
        }

        if start < self.documents.len() {
            groups.push(start..self.documents.len());
        }

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(tokens: usize) -> String {
        "abcd".repeat(tokens)
    }

    #[test]
    fn test_from_partials_orders_by_chunk() {
        let set = CollapseSet::from_partials(vec![
            PartialResult { text: "third".into(), source_chunk_index: 3 },
            PartialResult { text: "first".into(), source_chunk_index: 1 },
            PartialResult { text: "second".into(), source_chunk_index: 2 },
        ]);
        assert_eq!(set.documents(), ["first", "second", "third"]);
    }

    #[test]
    fn test_partition_greedy_contiguous() {
        let set = CollapseSet::new(vec![doc(4), doc(4), doc(3), doc(6), doc(1), doc(9)]);
        let groups = set.partition(10);
        assert_eq!(groups, vec![0..2, 2..5, 5..6]);

        for group in &groups {
            let members = &set.documents()[group.clone()];
            assert!(estimate_documents(members) <= 10);
        }
    }

    #[test]
    fn test_partition_covers_every_document_once() {
        let set = CollapseSet::new((1..=12).map(|i| doc(i % 5 + 1)).collect());
        let groups = set.partition(7);
        let covered: Vec<usize> = groups.iter().flat_map(|g| g.clone()).collect();
        assert_eq!(covered, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_oversized_document_stands_alone() {
        let set = CollapseSet::new(vec![doc(2), doc(20), doc(2)]);
        assert_eq!(set.partition(10), vec![0..1, 1..2, 2..3]);
        assert_eq!(set.largest_document_tokens(), 20);
    }

    #[test]
    fn test_fits_budget() {
        let set = CollapseSet::new(vec![doc(3), doc(3)]);
        assert_eq!(set.tokens(), 6);
        assert!(set.fits(6));
        assert!(!set.fits(5));
        assert!(CollapseSet::default().fits(0));
    }
}
