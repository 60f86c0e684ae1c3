//! RelationAggregator: applies content events to related-tag records

use super::content::TaggedContent;
use super::rank::{build_record, rank, ranked_view, RankedRelation, DEFAULT_MAX_RELATED};
use super::record::{Delta, TagRelationRecord};
use crate::config::Config;
use crate::render::{LinkRenderer, TemplateRenderer};
use crate::storage::{Expected, RelationStore, StorageError, WriteOutcome};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Default number of read-merge-write attempts per tag
pub const DEFAULT_MAX_RETRIES: u32 = 8;

/// Errors that can occur while aggregating related tags
#[derive(Debug, Error)]
pub enum RelationError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Tag '{tag}' was modified concurrently; gave up after {attempts} attempts")]
    Contention { tag: String, attempts: u32 },
}

/// Result type for aggregator operations
pub type RelationResult<T> = Result<T, RelationError>;

/// Maintains the related-tag record of every tag in a store.
///
/// Holds no tag state itself. Each per-tag update is a read-merge-write
/// cycle closed with a compare-and-swap on the record's version stamp, so
/// one aggregator (or several processes sharing a database) may apply
/// events concurrently without losing updates.
#[derive(Clone)]
pub struct RelationAggregator {
    store: Arc<dyn RelationStore>,
    renderer: Arc<dyn LinkRenderer>,
    max_related: usize,
    max_retries: u32,
}

impl RelationAggregator {
    /// Create an aggregator over `store` with default settings
    pub fn new(store: Arc<dyn RelationStore>) -> Self {
        Self {
            store,
            renderer: Arc::new(TemplateRenderer::default()),
            max_related: DEFAULT_MAX_RELATED,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Create an aggregator configured from `config`
    pub fn from_config(store: Arc<dyn RelationStore>, config: &Config) -> Self {
        Self::new(store)
            .with_renderer(Arc::new(TemplateRenderer::new(config.link_template.clone())))
            .with_max_related(config.max_related)
            .with_max_retries(config.max_retries)
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn LinkRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Cap on retained related tags (inclusive, at least 1)
    pub fn with_max_related(mut self, max_related: usize) -> Self {
        self.max_related = max_related.max(1);
        self
    }

    /// Attempts per tag before giving up with `Contention` (at least 1)
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn max_related(&self) -> usize {
        self.max_related
    }

    pub fn store(&self) -> &Arc<dyn RelationStore> {
        &self.store
    }

    // --- Write ---

    /// Apply the tag set of one content item.
    ///
    /// Repeated tag names count once. Fewer than two distinct tags is a
    /// no-op. Updates that completed before an error stay applied.
    pub fn apply<S: AsRef<str>>(&self, tags: &[S], delta: Delta) -> RelationResult<()> {
        let mut seen = HashSet::new();
        let distinct: Vec<&str> = tags
            .iter()
            .map(AsRef::as_ref)
            .filter(|tag| seen.insert(*tag))
            .collect();

        if distinct.len() < 2 {
            debug!(tags = distinct.len(), %delta, "fewer than two tags, nothing to relate");
            return Ok(());
        }

        for (i, tag) in distinct.iter().enumerate() {
            let others: Vec<&str> = distinct
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, other)| *other)
                .collect();
            self.update_one(tag, &others, delta)?;
        }

        Ok(())
    }

    /// Record a newly created content item
    pub fn add_content(&self, item: &impl TaggedContent) -> RelationResult<()> {
        self.apply(item.tags(), Delta::Add)
    }

    /// Retract a deleted content item
    pub fn remove_content(&self, item: &impl TaggedContent) -> RelationResult<()> {
        self.apply(item.tags(), Delta::Remove)
    }

    /// Merge `others` into the record for `tag` and persist the result.
    ///
    /// Returns the record as written, or `None` if nothing was retained and
    /// the record is now absent.
    pub fn update_one<S: AsRef<str>>(
        &self,
        tag: &str,
        others: &[S],
        delta: Delta,
    ) -> RelationResult<Option<TagRelationRecord>> {
        for attempt in 1..=self.max_retries {
            let current = self.store.find_one(tag)?;
            let expected = Expected::from_read(current.as_ref());

            let merged = merge_counters(current.map(|v| v.record.counters), others, delta);
            let merged_len = merged.len();
            let ranked = rank(merged, self.max_related);
            debug!(tag, merged = merged_len, retained = ranked.len(), %delta, "merged related tags");

            let record = build_record(tag, &ranked, self.renderer.as_ref());
            let outcome = match &record {
                Some(record) => self.store.save_if(record, expected)?,
                None => {
                    debug!(tag, "removing orphan tag from related tags");
                    self.store.remove_if(tag, expected)?
                }
            };

            if outcome == WriteOutcome::Applied {
                return Ok(record);
            }
            warn!(tag, attempt, "related tags changed during update, retrying");
        }

        Err(RelationError::Contention {
            tag: tag.to_string(),
            attempts: self.max_retries,
        })
    }

    // --- Read ---

    /// The full record for `tag`, if one exists
    pub fn get_record(&self, tag: &str) -> RelationResult<Option<TagRelationRecord>> {
        Ok(self.store.find_one(tag)?.map(|v| v.record))
    }

    /// The retained counter map for `tag`, if a record exists
    pub fn get_related(&self, tag: &str) -> RelationResult<Option<HashMap<String, i64>>> {
        Ok(self.get_record(tag)?.map(|record| record.counters))
    }

    /// The rendered presentation for `tag`; empty when there is none
    pub fn get_rendered(&self, tag: &str) -> RelationResult<String> {
        Ok(self
            .get_record(tag)?
            .map(|record| record.rendered)
            .unwrap_or_default())
    }

    /// Related tags for `tag`, highest count first; empty when there is none
    pub fn ranked(&self, tag: &str) -> RelationResult<Vec<RankedRelation>> {
        Ok(self
            .get_related(tag)?
            .map(|counters| ranked_view(&counters))
            .unwrap_or_default())
    }
}

impl std::fmt::Debug for RelationAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationAggregator")
            .field("max_related", &self.max_related)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

/// Add `delta` to the counter of every occurrence in `others`.
///
/// Starting from no existing counters this seeds each related tag with its
/// multiplicity in `others`, scaled by `delta`.
pub fn merge_counters<S: AsRef<str>>(
    existing: Option<HashMap<String, i64>>,
    others: &[S],
    delta: Delta,
) -> HashMap<String, i64> {
    let mut counters = existing.unwrap_or_default();
    for other in others {
        *counters.entry(other.as_ref().to_string()).or_insert(0) += delta.value();
    }
    counters
}
