//! Unit tests for the LinkTreeManager editing session.
//!
//! Covers the draft/commit/cancel cycle, backup rotation and restore,
//! cut/paste through the move buffer, search, import/export and the
//! alternate file binding.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use linktree::database::Database;
use linktree::managers::link_tree_manager::{LinkTreeManager, LinkTreeManagerTrait};
use linktree::managers::tree_store::{SqliteTreeStore, TreeStore};
use linktree::services::file_binding::{LocalFileHandle, TextFileHandle};
use linktree::services::normalizer::normalize;
use linktree::types::errors::{LinkTreeError, StorageError, TreeError};
use linktree::types::link_tree::{FolderNode, MoveBuffer};
use linktree::types::settings::EditorSettings;
use serde_json::Value;

/// Helper: a loaded session over a fresh in-memory database.
fn setup() -> (Arc<Database>, LinkTreeManager<SqliteTreeStore>) {
    let db = Arc::new(Database::open_in_memory().expect("Failed to open in-memory database"));
    let mut mgr = LinkTreeManager::new(SqliteTreeStore::new(Arc::clone(&db)));
    mgr.load().unwrap();
    (db, mgr)
}

/// Store whose writes can be switched off to simulate backend failures.
#[derive(Default)]
struct FlakyStore {
    primary: RefCell<Option<Value>>,
    backup: RefCell<Option<Value>>,
    fail_writes: Cell<bool>,
}

impl FlakyStore {
    fn write(&self, slot: &RefCell<Option<Value>>, tree: &[FolderNode]) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::DatabaseError("disk unavailable".to_string()));
        }
        *slot.borrow_mut() = Some(serde_json::to_value(tree).unwrap());
        Ok(())
    }
}

impl TreeStore for FlakyStore {
    fn read_persisted(&self) -> Result<Option<Value>, StorageError> {
        Ok(self.primary.borrow().clone())
    }
    fn write_persisted(&self, tree: &[FolderNode]) -> Result<(), StorageError> {
        self.write(&self.primary, tree)
    }
    fn read_backup(&self) -> Result<Option<Value>, StorageError> {
        Ok(self.backup.borrow().clone())
    }
    fn write_backup(&self, tree: &[FolderNode]) -> Result<(), StorageError> {
        self.write(&self.backup, tree)
    }
}

// --- Draft / commit / cancel ---

#[test]
fn test_fresh_session_is_empty_and_clean() {
    let (_db, mgr) = setup();
    assert!(mgr.tree().is_empty());
    assert!(!mgr.is_dirty());
}

#[test]
fn test_edits_mark_dirty_and_save_commits() {
    let (_db, mut mgr) = setup();
    let work = mgr.add_folder(None, "Work").unwrap();
    mgr.add_link(&work, "Mail", "https://mail.example").unwrap();
    assert!(mgr.is_dirty());

    mgr.save().unwrap();

    assert!(!mgr.is_dirty());
    let persisted = normalize(&mgr.store().read_persisted().unwrap().unwrap());
    assert_eq!(&persisted, mgr.tree());
    assert_eq!(mgr.saved_tree(), mgr.tree());
}

#[test]
fn test_reverting_an_edit_by_hand_clears_dirty() {
    let (_db, mut mgr) = setup();
    let work = mgr.add_folder(None, "Work").unwrap();
    mgr.save().unwrap();

    mgr.rename_folder(&work, "Play");
    assert!(mgr.is_dirty());
    mgr.rename_folder(&work, "Work");
    assert!(!mgr.is_dirty());
}

#[test]
fn test_cancel_restores_saved_snapshot() {
    let (_db, mut mgr) = setup();
    let work = mgr.add_folder(None, "Work").unwrap();
    let docs = mgr.add_folder(Some(work.as_str()), "Docs").unwrap();
    mgr.add_link(&docs, "Wiki", "https://wiki.example").unwrap();
    mgr.save().unwrap();
    let before = mgr.tree().clone();

    assert!(mgr.delete_folder(&work), "deleting a folder removes its subtree");
    assert!(mgr.tree().is_empty());
    mgr.cancel();

    assert_eq!(mgr.tree(), &before);
    assert!(!mgr.is_dirty());
}

#[test]
fn test_missing_ids_are_silent_noops() {
    let (_db, mut mgr) = setup();
    assert_eq!(mgr.add_folder(Some("ghost"), "X"), None);
    assert_eq!(mgr.add_link("ghost", "X", "https://x.example"), None);
    assert!(!mgr.rename_folder("ghost", "X"));
    assert!(!mgr.update_link("ghost", Some("X"), None));
    assert!(!mgr.delete_folder("ghost"));
    assert!(!mgr.delete_link("ghost"));
    assert!(!mgr.move_folder_up("ghost"));
    assert!(!mgr.move_link_down("ghost"));
    assert!(!mgr.is_dirty());
}

#[test]
fn test_update_link_changes_only_given_fields() {
    let (_db, mut mgr) = setup();
    let f = mgr.add_folder(None, "F").unwrap();
    let l = mgr.add_link(&f, "Old", "https://old.example").unwrap();

    assert!(mgr.update_link(&l, None, Some("https://new.example")));

    let link = &mgr.tree()[0].links[0];
    assert_eq!(link.title, "Old");
    assert_eq!(link.url, "https://new.example");
}

#[test]
fn test_reorder_siblings() {
    let (_db, mut mgr) = setup();
    let a = mgr.add_folder(None, "A").unwrap();
    let b = mgr.add_folder(None, "B").unwrap();
    let l1 = mgr.add_link(&a, "1", "").unwrap();
    let l2 = mgr.add_link(&a, "2", "").unwrap();

    assert!(mgr.move_folder_down(&a));
    assert_eq!(mgr.tree()[0].id, b);
    assert!(mgr.move_link_up(&l2));
    assert_eq!(mgr.tree()[1].links[0].id, l2);
    assert!(!mgr.move_link_up(&l2));
    assert_eq!(mgr.tree()[1].links[1].id, l1);
}

// --- Failure handling ---

#[test]
fn test_failed_save_keeps_draft_and_dirty() {
    let mut mgr = LinkTreeManager::new(FlakyStore::default());
    mgr.load().unwrap();
    mgr.add_folder(None, "Work").unwrap();
    let draft = mgr.tree().clone();

    mgr.store().fail_writes.set(true);
    let err = mgr.save().unwrap_err();

    assert!(matches!(err, LinkTreeError::Storage(_)));
    assert!(mgr.is_dirty());
    assert_eq!(mgr.tree(), &draft);
    assert!(mgr.saved_tree().is_empty());

    mgr.store().fail_writes.set(false);
    mgr.save().unwrap();
    assert!(!mgr.is_dirty());
}

// --- Backup protocol ---

#[test]
fn test_save_rotates_previous_tree_into_backup() {
    let (_db, mut mgr) = setup();
    mgr.add_folder(None, "A").unwrap();
    mgr.save().unwrap();
    let a = mgr.tree().clone();
    assert_eq!(mgr.store().read_backup().unwrap(), None, "nothing to back up on first save");

    mgr.add_folder(None, "B").unwrap();
    mgr.save().unwrap();

    let backup = normalize(&mgr.store().read_backup().unwrap().unwrap());
    assert_eq!(backup, a);
}

#[test]
fn test_restore_from_backup_brings_back_previous_generation() {
    let (_db, mut mgr) = setup();
    let a_id = mgr.add_folder(None, "A").unwrap();
    mgr.save().unwrap();
    let a = mgr.tree().clone();

    mgr.delete_folder(&a_id);
    mgr.add_folder(None, "B").unwrap();
    mgr.save().unwrap();

    assert!(mgr.restore_from_backup().unwrap());
    assert_eq!(mgr.tree(), &a);
    assert_eq!(mgr.saved_tree(), &a);
    assert!(mgr.is_dirty(), "restored state awaits confirmation");

    mgr.save().unwrap();
    assert!(!mgr.is_dirty());
    assert_eq!(normalize(&mgr.store().read_persisted().unwrap().unwrap()), a);
}

#[test]
fn test_restore_without_backup_reports_none() {
    let (_db, mut mgr) = setup();
    assert!(!mgr.restore_from_backup().unwrap());

    // First save has no predecessor; the second backs up an empty tree.
    mgr.save().unwrap();
    mgr.add_folder(None, "A").unwrap();
    mgr.save().unwrap();
    assert!(!mgr.restore_from_backup().unwrap());
    assert!(!mgr.is_dirty());
}

// --- Moves and the move buffer ---

#[test]
fn test_move_folder_into_own_descendant_is_rejected() {
    let (_db, mut mgr) = setup();
    let outer = mgr.add_folder(None, "Outer").unwrap();
    let inner = mgr.add_folder(Some(outer.as_str()), "Inner").unwrap();
    mgr.save().unwrap();

    let err = mgr.move_folder(&outer, Some(inner.as_str()), 0).unwrap_err();

    assert_eq!(err, LinkTreeError::Tree(TreeError::CycleDetected(outer.clone())));
    assert!(!mgr.is_dirty());
}

#[test]
fn test_cut_and_paste_folder() {
    let (_db, mut mgr) = setup();
    let a = mgr.add_folder(None, "A").unwrap();
    let b = mgr.add_folder(None, "B").unwrap();
    mgr.add_link(&a, "Link", "https://a.example").unwrap();

    mgr.cut_folder(&a).unwrap();
    assert!(matches!(mgr.held(), MoveBuffer::HoldingFolder(f) if f.id == a));
    assert_eq!(mgr.tree().len(), 1);

    let pasted = mgr.paste(Some(b.as_str()), None).unwrap();

    assert_eq!(pasted, a);
    assert!(mgr.held().is_empty());
    assert_eq!(mgr.tree()[0].children[0].id, a);
    assert_eq!(mgr.tree()[0].children[0].links.len(), 1);
}

#[test]
fn test_move_buffer_holds_one_node_at_a_time() {
    let (_db, mut mgr) = setup();
    let a = mgr.add_folder(None, "A").unwrap();
    let l = mgr.add_link(&a, "L", "").unwrap();

    mgr.cut_link(&l).unwrap();
    let err = mgr.cut_folder(&a).unwrap_err();

    assert_eq!(err, LinkTreeError::Tree(TreeError::MoveBufferOccupied(l.clone())));
    assert_eq!(mgr.tree().len(), 1, "second cut did not detach anything");
}

#[test]
fn test_refused_paste_keeps_node_held() {
    let (_db, mut mgr) = setup();
    let a = mgr.add_folder(None, "A").unwrap();
    let l = mgr.add_link(&a, "L", "").unwrap();
    mgr.cut_link(&l).unwrap();

    assert_eq!(
        mgr.paste(None, None).unwrap_err(),
        LinkTreeError::Tree(TreeError::LinkNeedsFolder)
    );
    assert_eq!(
        mgr.paste(Some("ghost"), None).unwrap_err(),
        LinkTreeError::Tree(TreeError::NotFound("ghost".to_string()))
    );
    assert_eq!(mgr.held().held_id(), Some(l.as_str()));

    mgr.paste(Some(a.as_str()), Some(0)).unwrap();
    assert_eq!(mgr.tree()[0].links[0].id, l);
    assert_eq!(
        mgr.paste(Some(a.as_str()), None).unwrap_err(),
        LinkTreeError::Tree(TreeError::MoveBufferEmpty)
    );
}

#[test]
fn test_save_refused_while_holding_and_cancel_clears_buffer() {
    let (_db, mut mgr) = setup();
    let a = mgr.add_folder(None, "A").unwrap();
    mgr.save().unwrap();

    mgr.cut_folder(&a).unwrap();
    assert_eq!(
        mgr.save().unwrap_err(),
        LinkTreeError::MoveInProgress(a.clone())
    );

    mgr.cancel();
    assert!(mgr.held().is_empty());
    assert_eq!(mgr.tree()[0].id, a);
}

#[test]
fn test_discard_held_returns_node() {
    let (_db, mut mgr) = setup();
    let a = mgr.add_folder(None, "A").unwrap();
    mgr.cut_folder(&a).unwrap();

    let dropped = mgr.discard_held();

    assert_eq!(dropped.held_id(), Some(a.as_str()));
    assert!(mgr.held().is_empty());
    mgr.save().unwrap();
    assert!(mgr.tree().is_empty());
}

// --- Whole-tree operations and search ---

#[test]
fn test_prune_and_sort() {
    let (_db, mut mgr) = setup();
    let z = mgr.add_folder(None, "zeta").unwrap();
    mgr.add_link(&z, "x", "https://x.example").unwrap();
    let empty = mgr.add_folder(None, "Empty").unwrap();
    mgr.add_folder(Some(empty.as_str()), "Also empty").unwrap();
    mgr.add_folder(None, "Alpha").unwrap();

    assert_eq!(mgr.prune_empty(), 3);
    assert_eq!(mgr.tree().len(), 1);

    let a = mgr.add_folder(None, "alpha").unwrap();
    mgr.add_link(&a, "y", "https://y.example").unwrap();
    mgr.sort_all();
    assert_eq!(mgr.tree()[0].id, a);
}

#[test]
fn test_search_is_a_view_only() {
    let (_db, mut mgr) = setup();
    let work = mgr.add_folder(None, "Work").unwrap();
    mgr.add_link(&work, "Mail", "https://mail.example").unwrap();
    mgr.add_link(&work, "Calendar", "https://cal.example").unwrap();
    mgr.add_folder(None, "Home").unwrap();
    mgr.save().unwrap();

    mgr.set_search_query("mail");
    let view = mgr.visible_tree();

    assert_eq!(mgr.search_query(), "mail");
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].links.len(), 1);
    assert_eq!(mgr.tree().len(), 2);
    assert!(!mgr.is_dirty());

    mgr.set_search_query("");
    assert_eq!(&mgr.visible_tree(), mgr.tree());
}

// --- Import / export ---

#[test]
fn test_text_export_import_roundtrip() {
    let (_db, mut mgr) = setup();
    let work = mgr.add_folder(None, "Work").unwrap();
    mgr.add_link(&work, "Mail", "https://mail.example").unwrap();
    let text = mgr.export_text();
    assert_eq!(
        text,
        "=== LINK TREE ===\n\n📁 Work\n  🔗 Mail\n     https://mail.example\n"
    );

    let (_db2, mut other) = setup();
    let skipped = other.import_text(&text).unwrap();

    assert_eq!(skipped, 0);
    assert!(other.is_dirty());
    assert_eq!(other.export_text(), text);
}

#[test]
fn test_import_text_without_folders_is_rejected() {
    let (_db, mut mgr) = setup();
    mgr.add_folder(None, "Keep").unwrap();
    let err = mgr.import_text("hello\nworld\n").unwrap_err();
    assert!(matches!(err, LinkTreeError::InvalidImport(_)));
    assert_eq!(mgr.tree()[0].title, "Keep");
}

#[test]
fn test_json_export_import_preserves_ids() {
    let (_db, mut mgr) = setup();
    let work = mgr.add_folder(None, "Work").unwrap();
    mgr.add_link(&work, "Mail", "https://mail.example").unwrap();
    let json = mgr.export_json().unwrap();

    let (_db2, mut other) = setup();
    assert_eq!(other.import_json(&json).unwrap(), 0);
    assert_eq!(other.tree(), mgr.tree());
}

#[test]
fn test_import_json_is_lenient_but_needs_json() {
    let (_db, mut mgr) = setup();
    let dropped = mgr
        .import_json(r#"[{"title": "Ok", "links": [1, {"title": "L"}]}, "junk"]"#)
        .unwrap();
    assert_eq!(dropped, 2);
    assert_eq!(mgr.tree()[0].links.len(), 1);

    assert!(matches!(
        mgr.import_json("not json"),
        Err(LinkTreeError::InvalidImport(_))
    ));
}

// --- Settings-driven save behavior ---

#[test]
fn test_prune_on_save_setting() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let editor = EditorSettings {
        prune_on_save: true,
        sort_on_save: true,
    };
    let mut mgr = LinkTreeManager::with_settings(SqliteTreeStore::new(Arc::clone(&db)), editor);
    mgr.load().unwrap();
    let b = mgr.add_folder(None, "b").unwrap();
    mgr.add_link(&b, "x", "https://x.example").unwrap();
    mgr.add_folder(None, "empty").unwrap();
    let a = mgr.add_folder(None, "A").unwrap();
    mgr.add_link(&a, "y", "https://y.example").unwrap();

    mgr.save().unwrap();

    let ids: Vec<_> = mgr.tree().iter().map(|f| f.id.clone()).collect();
    assert_eq!(ids, vec![a, b]);
    assert!(!mgr.is_dirty());
}

// --- File binding ---

#[test]
fn test_bound_file_receives_saves_without_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("links.json");
    let (_db, mut mgr) = setup();
    mgr.bind_file(Box::new(LocalFileHandle::new(&path)));
    assert!(mgr.bound_file().unwrap().ends_with("links.json"));

    mgr.add_folder(None, "First").unwrap();
    mgr.save().unwrap();
    mgr.add_folder(None, "Second").unwrap();
    mgr.save().unwrap();

    assert_eq!(mgr.store().read_persisted().unwrap(), None);
    assert_eq!(mgr.store().read_backup().unwrap(), None);

    let text = LocalFileHandle::new(&path).read_text().unwrap();
    let from_file = normalize(&serde_json::from_str::<Value>(&text).unwrap());
    assert_eq!(&from_file, mgr.tree());
}

#[test]
fn test_load_reads_from_bound_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("links.json");
    std::fs::write(&path, r#"[{"id": "f1", "title": "From file"}]"#).unwrap();

    let (_db, mut mgr) = setup();
    mgr.bind_file(Box::new(LocalFileHandle::new(&path)));
    mgr.load().unwrap();
    assert_eq!(mgr.tree()[0].id, "f1");

    assert!(mgr.unbind_file().is_some());
    mgr.load().unwrap();
    assert!(mgr.tree().is_empty());
}

// --- Unreadable stored data ---

#[test]
fn test_unreadable_stored_tree_loads_empty_and_is_overwritten() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    db.put_value("link_tree", "{not json").unwrap();
    let mut mgr = LinkTreeManager::new(SqliteTreeStore::new(Arc::clone(&db)));

    assert_eq!(mgr.load().unwrap(), 1);
    assert!(mgr.tree().is_empty());

    mgr.import_json(r#"[{"id": "f1", "title": "Recovered"}]"#).unwrap();
    mgr.save().unwrap();

    assert!(!mgr.is_dirty());
    let stored = normalize(&mgr.store().read_persisted().unwrap().unwrap());
    assert_eq!(&stored, mgr.tree());
    assert_eq!(mgr.store().read_backup().unwrap(), None, "garbage is not rotated into the backup");

    // A later save rotates normally again.
    mgr.add_folder(None, "Next").unwrap();
    mgr.save().unwrap();
    assert_eq!(normalize(&mgr.store().read_backup().unwrap().unwrap())[0].id, "f1");
}

#[test]
fn test_unreadable_bound_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("links.json");
    std::fs::write(&path, "[{broken").unwrap();

    let (_db, mut mgr) = setup();
    mgr.bind_file(Box::new(LocalFileHandle::new(&path)));
    assert_eq!(mgr.load().unwrap(), 1);
    assert!(mgr.tree().is_empty());

    mgr.add_folder(None, "Fresh").unwrap();
    mgr.save().unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(&normalize(&serde_json::from_str::<Value>(&text).unwrap()), mgr.tree());
}
