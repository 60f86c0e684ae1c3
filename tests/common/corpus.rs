//! Synthetic tagged-content corpora

use cotag::ContentItem;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Shape of a generated corpus
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    pub items: usize,
    pub vocabulary: usize,
    pub max_tags_per_item: usize,
    pub seed: u64,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            items: 60,
            vocabulary: 12,
            max_tags_per_item: 5,
            seed: 7,
        }
    }
}

/// Deterministic corpus: each item draws 1..=max distinct tags
pub fn random_corpus(config: &CorpusConfig) -> Vec<ContentItem> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let vocabulary: Vec<String> = (0..config.vocabulary).map(|i| format!("tag-{:02}", i)).collect();

    (0..config.items)
        .map(|i| {
            let n = rng.gen_range(1..=config.max_tags_per_item.min(vocabulary.len()));
            let tags: Vec<&String> = vocabulary.choose_multiple(&mut rng, n).collect();
            ContentItem::new(format!("item-{}", i)).with_tags(tags.into_iter().cloned())
        })
        .collect()
}
