//! Property-based tests for the per-connection directory history

use connbook_core::models::{DirectoryHistory, HISTORY_CAPACITY};
use proptest::prelude::*;

/// Reference model: most recent last, unique, bounded
fn model(items: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items.iter().filter(|i| !i.is_empty()) {
        out.retain(|existing| existing != item);
        out.push(item.clone());
        if out.len() > HISTORY_CAPACITY {
            out.remove(0);
        }
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The history matches an MRU reference model
    #[test]
    fn prop_history_matches_model(items in prop::collection::vec("(/[a-d]{0,2}){0,2}", 0..40)) {
        let mut history = DirectoryHistory::new();
        for item in &items {
            history.add_directory(item.as_str());
        }
        let actual: Vec<String> = history.iter().map(str::to_string).collect();
        prop_assert_eq!(&actual, &model(&items));
        prop_assert!(history.len() <= HISTORY_CAPACITY);
        prop_assert_eq!(history.most_recent(), actual.last().map(String::as_str));
    }

    /// Re-adding an entry makes it the most recent without duplicating it
    #[test]
    fn prop_readd_becomes_most_recent(items in prop::collection::vec("/[a-z]{1,4}", 1..15), pick in any::<usize>()) {
        let mut history: DirectoryHistory = items.iter().map(String::as_str).collect();
        let item = items[pick % items.len()].clone();
        let present = history.search(&item).is_some();
        let len = history.len();

        history.add_directory(item.as_str());
        prop_assert_eq!(history.most_recent(), Some(item.as_str()));
        if present {
            prop_assert_eq!(history.len(), len);
        }
        prop_assert_eq!(history.iter().filter(|i| *i == item).count(), 1);
    }
}
