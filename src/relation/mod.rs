//! Related-tag aggregation

mod aggregator;
mod content;
mod rank;
mod record;


pub use aggregator::{
    merge_counters, RelationAggregator, RelationError, RelationResult, DEFAULT_MAX_RETRIES,
};
pub use content::{ContentItem, TaggedContent};
pub use rank::{build_record, rank, RankedRelation, DEFAULT_MAX_RELATED};
pub use record::{Delta, TagRelationRecord};
