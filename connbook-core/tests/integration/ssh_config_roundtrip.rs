//! OpenSSH configuration import/export and document merge integration tests

use connbook_core::document::{Document, DocumentEvent};
use connbook_core::export::SshConfigExporter;
use connbook_core::import::{ImportSource, SshConfigImporter, merge_document_file};
use connbook_core::models::ConnectionRecord;
use std::cell::RefCell;
use std::rc::Rc;
use tempfile::TempDir;

const CONFIG: &str = "\
Host *
    ServerAliveInterval 60

Host web1 web2
    HostName web.example.com
    User deploy
    ForwardAgent yes

Host db
    HostName 10.0.0.5
    Port 5022
    IdentityFile /keys/db_ed25519
    StrictHostKeyChecking no
";

#[test]
fn test_import_commit_export_reimport() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config");
    std::fs::write(&config_path, CONFIG).unwrap();

    let mut document = Document::new();
    let root = document.tree().root();
    document
        .add_connection(root, ConnectionRecord::new_ssh("db", "old.example"))
        .unwrap();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    document.subscribe(move |event: &DocumentEvent| sink.borrow_mut().push(event.clone()));

    let importer = SshConfigImporter::new();
    let mut result = importer.import_from_path(&config_path).unwrap();
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].identifier, "*");

    let folder = document.ensure_folder("Imported/ssh").unwrap();
    let added = result.commit(&mut document, folder).unwrap();
    assert_eq!(added, 3);
    assert_eq!(result.renamed, vec![("db".to_string(), "db (copy)".to_string())]);
    assert_eq!(
        *events.borrow(),
        vec![
            DocumentEvent::FolderAdded {
                path: "Imported/ssh".to_string()
            },
            DocumentEvent::Rebuilt,
        ]
    );

    let copy = document.registry().get_by_name("db (copy)").unwrap();
    assert_eq!(copy.port, 5022);
    assert!(copy.options.disable_strict_key_checking);
    assert_eq!(
        document
            .symbolic_path_of(document.connection_node("web2").unwrap())
            .unwrap(),
        "Imported/ssh/web2"
    );

    let export_path = dir.path().join("exported");
    let export = SshConfigExporter::new()
        .export_to_path(document.registry(), &export_path)
        .unwrap();
    assert_eq!(export.exported, 4);
    assert!(export.content.contains("Host db_(copy)\n"));

    let reimported = importer.import_from_path(&export_path).unwrap();
    let names: Vec<&str> = reimported.connections.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["db", "db_(copy)", "web1", "web2"]);
    let web1 = &reimported.connections[2];
    assert_eq!(web1.host, "web.example.com");
    assert_eq!(web1.auth.user, "deploy");
    assert!(web1.options.agent_forwarding);
}

#[test]
fn test_merge_saved_document_into_folder() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("team.xml");

    let mut team = Document::new();
    let ops = team.ensure_folder("Ops/Linux").unwrap();
    team.add_connection(ops, ConnectionRecord::new_ssh("bastion", "b.example"))
        .unwrap();
    team.add_connection(team.tree().root(), ConnectionRecord::new_ssh("vpn", "v.example"))
        .unwrap();
    team.save(&path).unwrap();

    let mut document = Document::new();
    let root = document.tree().root();
    let ops_local = document.ensure_folder("Ops").unwrap();
    document
        .add_connection(ops_local, ConnectionRecord::new_ssh("vpn", "local.vpn"))
        .unwrap();

    let result = merge_document_file(&mut document, &path, root).unwrap();
    assert_eq!(result.connections.len(), 2);
    assert_eq!(result.renamed, vec![("vpn".to_string(), "vpn (copy)".to_string())]);

    let bastion = document.connection_node("bastion").unwrap();
    assert_eq!(document.symbolic_path_of(bastion).unwrap(), "Ops/Linux/bastion");
    assert_eq!(document.tree().children(ops_local).count(), 2);
    assert_eq!(document.registry().get_by_name("vpn").unwrap().host, "local.vpn");
    assert_eq!(document.registry().get_by_name("vpn (copy)").unwrap().host, "v.example");
    assert!(document.consistency_check().is_consistent());
}
