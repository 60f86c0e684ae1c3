//! End-to-end properties of the related-tag aggregator over SQLite

mod common;

use common::{random_corpus, snapshot, sqlite_aggregator, CorpusConfig};
use cotag::{Delta, RelationAggregator, DEFAULT_MAX_RELATED};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regex_lite::Regex;
use std::collections::HashMap;

fn related(aggregator: &RelationAggregator, tag: &str) -> HashMap<String, i64> {
    aggregator
        .get_related(tag)
        .unwrap()
        .unwrap_or_else(|| panic!("expected a record for '{}'", tag))
}

fn pairs(entries: &[(&str, i64)]) -> HashMap<String, i64> {
    entries.iter().map(|(t, c)| (t.to_string(), *c)).collect()
}

#[test]
fn single_tag_is_noop() {
    let aggregator = sqlite_aggregator();
    aggregator.apply(&["php"], Delta::Add).unwrap();
    aggregator.apply(&["php"], Delta::Remove).unwrap();

    assert!(snapshot(aggregator.store().as_ref()).is_empty());
}

#[test]
fn addition_is_symmetric() {
    let aggregator = sqlite_aggregator();
    aggregator.apply(&["a", "b", "c"], Delta::Add).unwrap();

    assert_eq!(related(&aggregator, "a"), pairs(&[("b", 1), ("c", 1)]));
    assert_eq!(related(&aggregator, "b"), pairs(&[("a", 1), ("c", 1)]));
    assert_eq!(related(&aggregator, "c"), pairs(&[("a", 1), ("b", 1)]));
}

#[test]
fn repeated_addition_accumulates() {
    let aggregator = sqlite_aggregator();
    aggregator.apply(&["a", "b", "c"], Delta::Add).unwrap();
    aggregator.apply(&["c", "a", "b"], Delta::Add).unwrap();

    for tag in ["a", "b", "c"] {
        let counters = related(&aggregator, tag);
        assert_eq!(counters.len(), 2);
        assert!(counters.values().all(|count| *count == 2), "{tag}: {counters:?}");
    }
}

#[test]
fn removal_restores_previous_state() {
    let aggregator = sqlite_aggregator();
    aggregator.apply(&["php", "mysql"], Delta::Add).unwrap();
    aggregator.apply(&["php", "zend", "pdo"], Delta::Add).unwrap();
    let before = snapshot(aggregator.store().as_ref());

    let item = ["php", "mysql", "laravel"];
    aggregator.apply(&item, Delta::Add).unwrap();
    assert_ne!(snapshot(aggregator.store().as_ref()), before);

    aggregator.apply(&item, Delta::Remove).unwrap();
    assert_eq!(snapshot(aggregator.store().as_ref()), before);
    assert!(aggregator.get_record("laravel").unwrap().is_none());
}

#[test]
fn emptied_record_is_deleted() {
    let aggregator = sqlite_aggregator();
    aggregator.apply(&["php", "mysql"], Delta::Add).unwrap();
    aggregator.apply(&["php", "mysql"], Delta::Remove).unwrap();

    assert!(aggregator.get_record("php").unwrap().is_none());
    assert!(aggregator.get_record("mysql").unwrap().is_none());
    assert_eq!(aggregator.get_rendered("php").unwrap(), "");
    assert!(aggregator.store().list_tags().unwrap().is_empty());
}

#[test]
fn unmatched_removal_creates_nothing() {
    let aggregator = sqlite_aggregator();
    aggregator.apply(&["php", "mysql"], Delta::Remove).unwrap();
    assert!(aggregator.update_one::<&str>("php", &[], Delta::Add).unwrap().is_none());

    assert!(snapshot(aggregator.store().as_ref()).is_empty());
}

#[test]
fn cap_keeps_highest_counts() {
    let aggregator = sqlite_aggregator();

    // rel-40 co-occurs forty times with hub, rel-01 once. Heaviest first:
    // a newcomer at count 1 is cut once the table is full.
    for i in (1..=40i64).rev() {
        let related_tag = format!("rel-{:02}", i);
        for _ in 0..i {
            aggregator.apply(&["hub", related_tag.as_str()], Delta::Add).unwrap();
        }
    }

    let record = aggregator.get_record("hub").unwrap().unwrap();
    assert_eq!(record.count, DEFAULT_MAX_RELATED);
    assert_eq!(record.counters.len(), DEFAULT_MAX_RELATED);

    let ranked = aggregator.ranked("hub").unwrap();
    let counts: Vec<i64> = ranked.iter().map(|r| r.count).collect();
    let expected: Vec<i64> = (11..=40).rev().collect();
    assert_eq!(counts, expected);
    assert_eq!(ranked[0].tag, "rel-40");

    // The other side of each pair is never truncated
    assert_eq!(related(&aggregator, "rel-01"), pairs(&[("hub", 1)]));
}

#[test]
fn rendered_matches_count() {
    let aggregator = sqlite_aggregator();
    let fragment = Regex::new(r#"<div class="related-tag">"#).unwrap();

    for item in random_corpus(&CorpusConfig::default()) {
        aggregator.add_content(&item).unwrap();
    }

    let records = snapshot(aggregator.store().as_ref());
    assert!(!records.is_empty());
    for (tag, record) in records {
        assert_eq!(record.count, record.counters.len(), "{tag}");
        assert_eq!(fragment.find_iter(&record.rendered).count(), record.count, "{tag}");
        assert!(record.counters.values().all(|count| *count > 0), "{tag}");
    }
}

#[test]
fn rendered_lists_highest_first() {
    let aggregator = sqlite_aggregator();
    aggregator.apply(&["php", "pdo"], Delta::Add).unwrap();
    aggregator.apply(&["php", "mysql"], Delta::Add).unwrap();
    aggregator.apply(&["php", "mysql"], Delta::Add).unwrap();

    let rendered = aggregator.get_rendered("php").unwrap();
    let mysql = rendered.find("php+mysql").unwrap();
    let pdo = rendered.find("php+pdo").unwrap();
    assert!(mysql < pdo);
    assert!(rendered.contains(r#"title="php mysql""#));
    assert!(rendered.contains("&times;&nbsp;2"));
}

#[test]
fn application_order_does_not_matter() {
    let corpus = random_corpus(&CorpusConfig::default());
    let mut shuffled = corpus.clone();
    shuffled.shuffle(&mut StdRng::seed_from_u64(99));

    let forward = sqlite_aggregator();
    for item in &corpus {
        forward.add_content(item).unwrap();
    }
    let reordered = sqlite_aggregator();
    for item in &shuffled {
        reordered.add_content(item).unwrap();
    }

    assert_eq!(
        snapshot(forward.store().as_ref()),
        snapshot(reordered.store().as_ref())
    );
}

#[test]
fn removing_every_item_empties_the_store() {
    let corpus = random_corpus(&CorpusConfig::default());
    let aggregator = sqlite_aggregator();
    for item in &corpus {
        aggregator.add_content(item).unwrap();
    }

    let mut removal_order = corpus.clone();
    removal_order.shuffle(&mut StdRng::seed_from_u64(3));
    for item in &removal_order {
        aggregator.remove_content(item).unwrap();
    }

    assert!(snapshot(aggregator.store().as_ref()).is_empty());
}

#[test]
fn read_accessors_agree() {
    let aggregator = sqlite_aggregator();
    aggregator.apply(&["rust", "tokio", "async"], Delta::Add).unwrap();

    let record = aggregator.get_record("rust").unwrap().unwrap();
    assert_eq!(record.id, "rust");
    assert_eq!(aggregator.get_related("rust").unwrap(), Some(record.counters.clone()));
    assert_eq!(aggregator.get_rendered("rust").unwrap(), record.rendered);
}
