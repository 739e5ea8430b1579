//! Document lifecycle integration tests
//!
//! Builds documents through the facade, persists them through the
//! filesystem and checks the scenarios a front-end relies on.

use std::cell::RefCell;
use std::rc::Rc;

use connbook_core::document::{Document, DocumentEvent};
use connbook_core::error::{ConnBookError, DocumentError, TreeError, ValidationError};
use connbook_core::models::{AuthMode, ConnectionRecord, StaticCatalog, Warnings};
use connbook_core::validator::{Subject, Validator};
use tempfile::TempDir;

/// root -> Servers -> DB1 (10.0.0.1), plus a top-level gateway
fn sample_document() -> Document {
    let mut document = Document::new();
    let root = document.tree().root();
    let servers = document.add_folder(root, "Servers").unwrap();
    document
        .add_connection(
            servers,
            ConnectionRecord::new_ssh("DB1", "10.0.0.1")
                .with_user("postgres")
                .with_password("s3cret"),
        )
        .unwrap();
    document
        .add_connection(root, ConnectionRecord::new("gateway", "gw.example", 23, "telnet"))
        .unwrap();
    document
}

fn recorder(document: &mut Document) -> Rc<RefCell<Vec<DocumentEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    document.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

#[test]
fn test_save_and_load_through_filesystem() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("connections.xml");

    let mut document = sample_document();
    let db1 = document.connection_node("db1").unwrap();
    document.add_history_directory("DB1", "/var/lib/postgresql").unwrap();
    let mut edited = document.record_of(db1).unwrap().clone();
    edited.auth.mode = AuthMode::SaveCredentials;
    edited.auth.user = "admin".to_string();
    edited.auth.password.set("p@ss <word>");
    edited.set_note("primary\nreplica lag < 5s & growing");
    document.edit_connection(db1, edited).unwrap();

    document.save(&path).unwrap();
    assert!(path.exists());
    assert!(!dir.path().join("nested").join(".connections.xml.tmp").exists());

    let loaded = Document::load(&path).unwrap();
    assert_eq!(loaded.version(), connbook_core::FORMAT_VERSION);
    assert_eq!(loaded.registry().count(), 2);
    let record = loaded.registry().get_by_name("DB1").unwrap();
    assert_eq!(record.password.expose(), "s3cret");
    assert_eq!(record.auth.password.expose(), "p@ss <word>");
    assert_eq!(record.note(), "primary\nreplica lag < 5s & growing");
    assert_eq!(record.history.most_recent(), Some("/var/lib/postgresql"));
    assert_eq!(
        loaded.symbolic_path_of(loaded.connection_node("DB1").unwrap()).unwrap(),
        "Servers/DB1"
    );
    assert!(loaded.consistency_check().is_consistent());

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains("s3cret"));
    assert!(!text.contains("p@ss"));
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = Document::load(&dir.path().join("absent.xml")).unwrap_err();
    assert!(matches!(err, DocumentError::Io(_)));
}

#[test]
fn test_load_malformed_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.xml");
    std::fs::write(&path, "<connbook version=\"2\"><folder name=\"a\"></connbook>").unwrap();
    assert!(matches!(Document::load(&path), Err(DocumentError::Parse(_))));
}

#[test]
fn test_legacy_layout_is_upgraded_on_save() {
    let legacy = r#"<?xml version="1.0" encoding="UTF-8"?>
<connbook version="1">
  <folder name="Old" expanded="1">
    <connection name="router" host="192.168.1.1" protocol="telnet" port="23">
      <authentication mode="save"/>
      <auth_user value="root"/>
      <auth_password value=""/>
      <note value="legacy &amp; kept"/>
    </connection>
  </folder>
</connbook>
"#;
    let document = Document::parse(legacy).unwrap();
    assert_eq!(document.version(), connbook_core::LEGACY_VERSION);
    let record = document.registry().get_by_name("router").unwrap();
    assert_eq!(record.auth.user, "root");
    assert_eq!(record.auth.mode, AuthMode::SaveCredentials);
    assert!(record.auth.password.is_empty());
    assert_eq!(record.note(), "legacy & kept");

    let upgraded = Document::parse(&document.render().unwrap()).unwrap();
    assert_eq!(upgraded.version(), connbook_core::FORMAT_VERSION);
    assert_eq!(upgraded.registry().get_by_name("router"), Some(record));
}

#[test]
fn test_validator_scenarios() {
    let document = sample_document();
    let tree = document.tree();
    let registry = document.registry();
    let validator = Validator::new(tree, registry);
    let root = tree.root();
    let servers = document.resolve_symbolic("Servers").unwrap();
    let db1 = document.connection_node("DB1").unwrap();

    assert_eq!(
        validator.validate_name(root, None, None, Subject::Folder("Servers")),
        Err(ValidationError::DuplicateAtLevel)
    );

    let clash = ConnectionRecord::new_ssh("DB1", "10.0.0.2");
    for parent in [root, servers] {
        assert_eq!(
            validator.validate_name(parent, None, None, Subject::Connection(&clash)),
            Err(ValidationError::DuplicateConnection)
        );
    }

    let hostless = ConnectionRecord::new_ssh("DB2", "");
    assert_eq!(
        validator.validate_name(servers, None, None, Subject::Connection(&hostless)),
        Err(ValidationError::MissingValue)
    );

    let same = registry.get_by_name("DB1").unwrap();
    assert_eq!(
        validator.validate_name(servers, Some(db1), Some("DB1"), Subject::Connection(same)),
        Ok(())
    );
}

#[test]
fn test_positional_addressing_with_holes() {
    let mut document = Document::new();
    let root = document.tree().root();
    document.add_folder(root, "A").unwrap();
    let b = document.add_folder(root, "B").unwrap();
    let c = document.add_folder(root, "C").unwrap();
    assert_eq!(document.positional_path_of(c).unwrap(), "2");

    document.delete_node(b).unwrap();
    assert_eq!(document.tree().slots(root).len(), 3);
    assert_eq!(document.positional_path_of(c).unwrap(), "1");
    assert_eq!(document.resolve_positional("1").unwrap(), c);

    let d = document.add_folder(root, "D").unwrap();
    assert_eq!(document.tree().slot_of(root, d), Some(1));
    assert_eq!(document.positional_path_of(d).unwrap(), "1");
    assert_eq!(document.positional_path_of(c).unwrap(), "2");
}

#[test]
fn test_failed_mutations_leave_document_untouched() {
    let mut document = sample_document();
    let before = document.render().unwrap();
    let root = document.tree().root();
    let servers = document.resolve_symbolic("Servers").unwrap();
    let gateway = document.connection_node("gateway").unwrap();

    assert!(matches!(
        document.add_folder(root, "Servers"),
        Err(ConnBookError::Validation(ValidationError::DuplicateAtLevel))
    ));
    assert!(matches!(
        document.add_connection(servers, ConnectionRecord::new_ssh("GATEWAY", "x")),
        Err(ConnBookError::Validation(ValidationError::DuplicateConnection))
    ));
    assert!(matches!(
        document.add_connection(gateway, ConnectionRecord::new_ssh("x", "y")),
        Err(ConnBookError::Tree(TreeError::NotAFolder(_)))
    ));
    assert!(matches!(
        document.move_node(servers, servers),
        Err(ConnBookError::Tree(TreeError::CyclicMove(_)))
    ));
    assert!(matches!(
        document.delete_node(root),
        Err(ConnBookError::Tree(TreeError::NotFound(_)))
    ));

    assert_eq!(document.render().unwrap(), before);
}

#[test]
fn test_reload_emits_single_rebuilt_event() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("connections.xml");
    let mut on_disk = sample_document();
    on_disk
        .add_connection(on_disk.tree().root(), ConnectionRecord::new_ssh("extra", "e"))
        .unwrap();
    on_disk.save(&path).unwrap();

    let mut document = sample_document();
    let events = recorder(&mut document);
    document.reload(&path).unwrap();

    assert_eq!(*events.borrow(), vec![DocumentEvent::Rebuilt]);
    assert!(document.registry().contains("extra"));
    assert!(!document.is_rebuilding());

    document.clear().unwrap();
    assert!(document.is_empty());
    assert_eq!(events.borrow().len(), 2);
}

#[test]
fn test_warnings_recomputed_against_catalog() {
    let mut document = sample_document();
    let root = document.tree().root();
    document
        .add_connection(root, ConnectionRecord::new_ssh("db-alias", "10.0.0.1"))
        .unwrap();
    document
        .add_connection(root, ConnectionRecord::new("x", "h", 1, "gopher"))
        .unwrap();

    document.recompute_warnings(&StaticCatalog::builtin());
    let registry = document.registry();
    assert!(registry.get_by_name("DB1").unwrap().warnings.contains(Warnings::DUPLICATE_HOST));
    assert!(registry.get_by_name("db-alias").unwrap().warnings.contains(Warnings::DUPLICATE_HOST));
    assert!(registry.get_by_name("x").unwrap().warnings.contains(Warnings::PROTOCOL_MISSING));
    assert!(registry.get_by_name("gateway").unwrap().warnings.is_empty());
}

#[test]
fn test_duplicate_then_move_and_sort() {
    let mut document = sample_document();
    let root = document.tree().root();
    let db1 = document.connection_node("DB1").unwrap();

    let copy = document.duplicate_connection(db1).unwrap();
    let second = document.duplicate_connection(db1).unwrap();
    assert_eq!(document.tree().name(copy), "DB1 (copy)");
    assert_eq!(document.tree().name(second), "DB1 (copy 2)");

    document.move_node(copy, root).unwrap();
    assert_eq!(document.symbolic_path_of(copy).unwrap(), "DB1 (copy)");

    document.sort(root, true).unwrap();
    let names: Vec<&str> = document
        .tree()
        .children(root)
        .map(|id| document.tree().name(id))
        .collect();
    assert_eq!(names, vec!["DB1 (copy)", "gateway", "Servers"]);
    assert!(document.consistency_check().is_consistent());
}
