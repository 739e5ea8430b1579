//! Property-based tests for the connection registry
//!
//! The registry must stay sorted by case-insensitive name and must never
//! hold two records whose names differ only in case.

use connbook_core::models::ConnectionRecord;
use connbook_core::registry::Registry;
use connbook_core::error::ValidationError;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(String),
    Remove(String),
    Rename(String, String),
}

fn arb_name() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9 _-]{0,8}"
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => arb_name().prop_map(Op::Insert),
        2 => arb_name().prop_map(Op::Remove),
        2 => (arb_name(), arb_name()).prop_map(|(a, b)| Op::Rename(a, b)),
    ]
}

fn assert_sorted(registry: &Registry) -> Result<(), TestCaseError> {
    let keys: Vec<String> = registry.iter().map(|r| r.name.to_lowercase()).collect();
    for pair in keys.windows(2) {
        prop_assert!(pair[0] < pair[1], "{:?} is not strictly before {:?}", pair[0], pair[1]);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any mix of inserts, removals and renames keeps strict name order
    #[test]
    fn prop_registry_stays_sorted(ops in prop::collection::vec(arb_op(), 0..80)) {
        let mut registry = Registry::new();
        for op in ops {
            match op {
                Op::Insert(name) => {
                    let existed = registry.contains(&name);
                    let count = registry.count();
                    let result = registry.insert_sorted(ConnectionRecord::new_ssh(name.as_str(), "h"));
                    if existed {
                        prop_assert_eq!(result.err(), Some(ValidationError::DuplicateConnection));
                        prop_assert_eq!(registry.count(), count);
                    } else {
                        prop_assert!(result.is_ok());
                        prop_assert_eq!(registry.count(), count + 1);
                    }
                }
                Op::Remove(name) => {
                    let existed = registry.contains(&name);
                    prop_assert_eq!(registry.remove_by_name(&name).is_some(), existed);
                    prop_assert!(!registry.contains(&name));
                }
                Op::Rename(old, new) => {
                    let Some(record) = registry.get_by_name(&old) else {
                        continue;
                    };
                    let mut renamed = record.clone();
                    renamed.name = new.clone();
                    let count = registry.count();
                    if registry.replace(&old, renamed).is_ok() {
                        prop_assert!(registry.contains(&new));
                    } else {
                        prop_assert!(registry.contains(&old));
                    }
                    prop_assert_eq!(registry.count(), count);
                }
            }
            assert_sorted(&registry)?;
        }
    }

    /// Lookup ignores case
    #[test]
    fn prop_lookup_case_insensitive(name in arb_name()) {
        let mut registry = Registry::new();
        registry.insert_sorted(ConnectionRecord::new_ssh(name.as_str(), "h")).unwrap();
        prop_assert!(registry.contains(&name.to_uppercase()));
        prop_assert!(registry.contains(&name.to_lowercase()));
        prop_assert_eq!(
            registry.get_by_name(&name.to_uppercase()).map(|r| r.name.as_str()),
            Some(name.as_str())
        );
    }

    /// `index_of` agrees with iteration order
    #[test]
    fn prop_index_matches_iteration(names in prop::collection::vec(arb_name(), 0..30)) {
        let mut registry = Registry::new();
        for name in &names {
            let _ = registry.insert_sorted(ConnectionRecord::new_ssh(name.as_str(), "h"));
        }
        for (index, record) in registry.iter().enumerate() {
            prop_assert_eq!(registry.index_of(&record.name), Some(index));
            prop_assert_eq!(registry.get_by_index(index), Some(record));
        }
    }
}
