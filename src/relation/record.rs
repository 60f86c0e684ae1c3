//! The persisted per-tag record

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Related-tag table for one tag
///
/// `counters` holds only the retained top subset: every value is positive,
/// `count == counters.len()`, and `rendered` holds exactly `count`
/// fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRelationRecord {
    /// The tag this record belongs to
    pub id: String,
    /// Related tag name → co-occurrence count
    pub counters: HashMap<String, i64>,
    /// Number of retained related tags
    pub count: usize,
    /// Concatenated presentation fragments, highest count first
    pub rendered: String,
}

impl TagRelationRecord {
    /// An empty record for `id`; never persisted as-is
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            counters: HashMap::new(),
            count: 0,
            rendered: String::new(),
        }
    }
}

/// Direction of a content event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delta {
    /// A content item carrying the tags was created
    Add,
    /// A content item carrying the tags was deleted
    Remove,
}

impl Delta {
    /// The counter increment for this direction
    pub fn value(self) -> i64 {
        match self {
            Delta::Add => 1,
            Delta::Remove => -1,
        }
    }
}

impl std::fmt::Display for Delta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Delta::Add => write!(f, "add"),
            Delta::Remove => write!(f, "remove"),
        }
    }
}
