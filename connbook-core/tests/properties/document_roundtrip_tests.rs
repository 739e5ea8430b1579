//! Property-based tests for document persistence and the delete cascade

use connbook_core::document::Document;
use connbook_core::models::{AuthMode, ConnectionRecord};
use connbook_core::tree::NodeId;
use proptest::prelude::*;
use std::path::PathBuf;

/// Text with markup characters, quotes, whitespace controls and non-ASCII
fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 <>&\"'=/\\\\\n\t\u{e9}\u{4e2d}-]{0,16}"
}

fn arb_record(index: usize) -> impl Strategy<Value = ConnectionRecord> {
    (
        "[a-z][a-z0-9.]{0,10}",
        any::<u16>(),
        prop_oneof![Just("ssh"), Just("telnet"), Just("serial")],
        arb_text(),
        arb_text(),
        (arb_text(), arb_text(), arb_text()),
        prop::collection::vec("[a-z/]{1,10}", 0..4),
        (any::<bool>(), any::<bool>(), any::<bool>(), 0u32..600),
        prop_oneof![
            Just(AuthMode::Prompt),
            Just(AuthMode::SaveCredentials),
            Just(AuthMode::KeyFile),
        ],
    )
        .prop_map(
            move |(host, port, protocol, user, password, (note, directory, extra), history, flags, mode)| {
                let mut record = ConnectionRecord::new(format!("conn {index}"), host, port, protocol)
                    .with_user(user.clone())
                    .with_password(password.clone())
                    .with_note(note);
                record.directory = directory;
                record.extra_args = extra;
                record.last_user = user.clone();
                record.auth.mode = mode;
                record.auth.user = user;
                record.auth.password.set(password);
                if mode == AuthMode::KeyFile {
                    record.auth.identity_file = Some(PathBuf::from("/keys/id_ed25519"));
                }
                for dir in history {
                    record.history.add_directory(dir);
                }
                record.options.x11_forwarding = flags.0;
                record.options.agent_forwarding = flags.1;
                record.options.keep_alive = flags.2;
                record.options.keep_alive_interval = flags.3;
                record
            },
        )
}

/// Folder path index (0 = root) and a record for each connection
fn arb_layout() -> impl Strategy<Value = (Vec<String>, Vec<(usize, ConnectionRecord)>)> {
    let folders = prop::collection::vec("[A-Z][a-z]{0,6}( [a-z]{1,4})?", 0..4);
    let placements = prop::collection::vec(0usize..5, 0..8);
    (folders, placements).prop_flat_map(|(folders, placements)| {
        let records: Vec<_> = placements
            .iter()
            .enumerate()
            .map(|(index, &folder)| (Just(folder), arb_record(index)))
            .collect();
        (Just(folders), records)
    })
}

fn build(folders: &[String], placements: &[(usize, ConnectionRecord)]) -> Document {
    let mut document = Document::new();
    let mut targets: Vec<NodeId> = vec![document.tree().root()];
    for depth in 1..=folders.len() {
        let folder = document.ensure_folder(&folders[..depth].join("/")).unwrap();
        targets.push(folder);
    }
    for (folder, record) in placements {
        let target = targets[folder % targets.len()];
        document.add_connection(target, record.clone()).unwrap();
    }
    document
}

fn outline(document: &Document) -> Vec<(String, String, bool)> {
    let tree = document.tree();
    tree.descendants(tree.root())
        .into_iter()
        .map(|id| {
            let node = tree.get(id).unwrap();
            (
                tree.positional_path_of(id).unwrap(),
                tree.symbolic_path_of(id).unwrap(),
                node.is_folder(),
            )
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Rendering and parsing back reproduces the tree layout and every record
    #[test]
    fn prop_document_round_trip((folders, placements) in arb_layout()) {
        let document = build(&folders, &placements);
        let text = document.render().unwrap();
        let restored = Document::parse(&text).unwrap();

        prop_assert_eq!(outline(&restored), outline(&document));
        prop_assert_eq!(restored.registry().count(), document.registry().count());
        for record in document.registry() {
            let back = restored.registry().get_by_name(&record.name).unwrap();
            prop_assert_eq!(back, record);
        }
        prop_assert!(restored.consistency_check().is_consistent());
    }

    /// An unchanged document renders to identical text twice, since stored
    /// passwords are cached after the first read
    #[test]
    fn prop_render_stable_after_reload((folders, placements) in arb_layout()) {
        let document = build(&folders, &placements);
        let first = Document::parse(&document.render().unwrap()).unwrap();
        let once = first.render().unwrap();
        let twice = Document::parse(&once).unwrap().render().unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Deleting any node removes exactly the records of the leaves below it
    #[test]
    fn prop_delete_cascades((folders, placements) in arb_layout(), pick in any::<usize>()) {
        let mut document = build(&folders, &placements);
        let nodes = document.tree().descendants(document.tree().root());
        prop_assume!(!nodes.is_empty());
        let node = nodes[pick % nodes.len()];

        let mut expected: Vec<String> = std::iter::once(node)
            .chain(document.tree().descendants(node))
            .filter(|&id| document.record_of(id).is_some())
            .map(|id| document.tree().name(id).to_string())
            .collect();
        let before = document.registry().count();

        let mut removed = document.delete_node(node).unwrap();
        removed.sort();
        expected.sort();
        prop_assert_eq!(&removed, &expected);
        prop_assert_eq!(document.registry().count(), before - removed.len());
        for name in &removed {
            prop_assert!(!document.registry().contains(name));
        }
        prop_assert!(document.consistency_check().is_consistent());
    }
}
