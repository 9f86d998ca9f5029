use crate::record::{LinkRecord, PageRecord, VisitStatus};
use std::collections::HashMap;

/// Which records a projection includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFilter {
    /// Every record, including excluded ones.
    All,
    /// Everything except `ShouldNotVisit` records.
    Visitable,
    /// Only records that completed a visit, with or without an error.
    VisitedOnly,
}

/// The global link table: one record per canonical URL, in discovery
/// order.
///
/// A secondary index keyed by the query-less form of each URL lets the
/// traversal fold `/page?a=1` into an already-known `/page`. The first
/// record with a given query-less form owns that index entry.
#[derive(Debug, Default)]
pub struct LinkTable {
    records: HashMap<String, LinkRecord>,
    order: Vec<String>,
    base_keys: HashMap<String, String>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&LinkRecord> {
        self.records.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut LinkRecord> {
        self.records.get_mut(key)
    }

    /// The full key of the record owning this query-less form, if any.
    pub fn find_by_base(&self, base_key: &str) -> Option<&str> {
        self.base_keys.get(base_key).map(String::as_str)
    }

    /// Insert a newly discovered record. The key must not already be
    /// present; re-encounters go through `merge_encounter` instead.
    pub fn insert(&mut self, record: LinkRecord, base_key: String) {
        let key = record.key.clone();
        debug_assert!(!self.records.contains_key(&key));
        self.base_keys.entry(base_key).or_insert_with(|| key.clone());
        self.order.push(key.clone());
        self.records.insert(key, record);
    }

    /// Record another sighting of a known page: the raw reference is
    /// appended and the anchor text and href are overwritten when the
    /// new sighting carries them. Status and fetch results are left
    /// alone.
    pub fn merge_encounter(
        &mut self,
        key: &str,
        raw: &str,
        links_text: Option<&str>,
        href: Option<&str>,
    ) {
        if let Some(record) = self.records.get_mut(key) {
            record.original_urls.push(raw.to_string());
            if let Some(text) = links_text {
                record.links_text = Some(text.to_string());
            }
            if let Some(href) = href {
                record.href = Some(href.to_string());
            }
        }
    }

    /// Records in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &LinkRecord> {
        self.order.iter().filter_map(|key| self.records.get(key))
    }

    /// Project records for reporting, in discovery order.
    pub fn records(&self, filter: RecordFilter) -> Vec<PageRecord> {
        self.iter()
            .filter(|record| match filter {
                RecordFilter::All => true,
                RecordFilter::Visitable => record.status != VisitStatus::ShouldNotVisit,
                RecordFilter::VisitedOnly => matches!(
                    record.status,
                    VisitStatus::Visited | VisitStatus::VisitedWithError
                ),
            })
            .map(LinkRecord::project)
            .collect()
    }

    pub fn count_with_status(&self, status: VisitStatus) -> usize {
        self.iter().filter(|record| record.status == status).count()
    }
}

/// Discovery frontier: for each depth, which parents discovered which
/// children, both in first-seen order.
#[derive(Debug, Default)]
pub struct DepthFrontier {
    levels: Vec<Vec<(String, Vec<String>)>>,
}

impl DepthFrontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a child under its parent at the given depth. A child
    /// already queued under the same parent is not queued twice.
    pub fn enqueue(&mut self, depth: usize, parent: &str, child: String) {
        while self.levels.len() <= depth {
            self.levels.push(Vec::new());
        }
        let level = &mut self.levels[depth];
        match level.iter_mut().find(|(existing, _)| existing == parent) {
            Some((_, children)) => {
                if !children.contains(&child) {
                    children.push(child);
                }
            }
            None => level.push((parent.to_string(), vec![child])),
        }
    }

    /// The parent/children pairs queued at a depth, in discovery order.
    pub fn level(&self, depth: usize) -> Vec<(String, Vec<String>)> {
        self.levels.get(depth).cloned().unwrap_or_default()
    }

    pub fn is_empty_at(&self, depth: usize) -> bool {
        self.levels
            .get(depth)
            .map(|level| level.is_empty())
            .unwrap_or(true)
    }
}
