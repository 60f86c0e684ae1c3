//! Content items as seen by the aggregator

use serde::{Deserialize, Serialize};

/// Anything that carries an already-loaded set of tags
pub trait TaggedContent {
    fn tags(&self) -> &[String];
}

/// A minimal tagged content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ContentItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

impl TaggedContent for ContentItem {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}
