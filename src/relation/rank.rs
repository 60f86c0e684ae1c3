//! Ranking, truncation and rendering of a merged counter map

use super::record::TagRelationRecord;
use crate::render::{LinkRenderer, RelatedLink};
use std::collections::HashMap;

/// Default cap on retained related tags per record
pub const DEFAULT_MAX_RELATED: usize = 30;

/// One retained related tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedRelation {
    pub tag: String,
    pub count: i64,
}

/// Keep positive counters, highest first, at most `limit` of them.
///
/// Ties are ordered by tag name so the ranking does not depend on map
/// iteration order.
pub fn rank(counters: HashMap<String, i64>, limit: usize) -> Vec<RankedRelation> {
    let mut ranked: Vec<RankedRelation> = counters
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(tag, count)| RankedRelation { tag, count })
        .collect();

    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    ranked.truncate(limit);
    ranked
}

/// Ordered view of a stored counter map
pub fn ranked_view(counters: &HashMap<String, i64>) -> Vec<RankedRelation> {
    rank(counters.clone(), counters.len())
}

/// Build the record persisted for `tag`, or `None` when nothing is retained.
pub fn build_record(
    tag: &str,
    ranked: &[RankedRelation],
    renderer: &dyn LinkRenderer,
) -> Option<TagRelationRecord> {
    if ranked.is_empty() {
        return None;
    }

    let mut record = TagRelationRecord::new(tag);
    for relation in ranked {
        record
            .rendered
            .push_str(&renderer.render(&RelatedLink::new(tag, &relation.tag, relation.count)));
        record.counters.insert(relation.tag.clone(), relation.count);
    }
    record.count = record.counters.len();

    Some(record)
}
