//! Link Tree Manager.
//!
//! Implements `LinkTreeManagerTrait`: one editing session over the link
//! forest. Edits land in the draft; `save` rotates the stored tree into
//! the backup slot and then persists the draft; `cancel` throws edits
//! away; `restore_from_backup` brings back the previous generation.

use std::mem;

use serde_json::Value;

use crate::managers::draft_state::DraftState;
use crate::managers::tree_store::TreeStore;
use crate::services::file_binding::TextFileHandle;
use crate::services::id_generator::new_id;
use crate::services::normalizer::{normalize, normalize_with_report};
use crate::services::text_codec;
use crate::services::tree_filter::filter_tree;
use crate::services::tree_index::{self, find_folder_mut, find_link_mut};
use crate::services::tree_ops::{self, Shift};
use crate::types::errors::{LinkTreeError, StorageError, TreeError};
use crate::types::link_tree::{tree_stats, FolderNode, LinkEntry, MoveBuffer, Tree};
use crate::types::settings::EditorSettings;

/// Trait defining the editing session operations.
pub trait LinkTreeManagerTrait {
    fn load(&mut self) -> Result<usize, LinkTreeError>;
    fn save(&mut self) -> Result<(), LinkTreeError>;
    fn cancel(&mut self);
    fn restore_from_backup(&mut self) -> Result<bool, LinkTreeError>;
    fn is_dirty(&self) -> bool;
    fn tree(&self) -> &Tree;

    fn add_folder(&mut self, parent_id: Option<&str>, title: &str) -> Option<String>;
    fn add_link(&mut self, folder_id: &str, title: &str, url: &str) -> Option<String>;
    fn rename_folder(&mut self, id: &str, title: &str) -> bool;
    fn update_link(&mut self, id: &str, title: Option<&str>, url: Option<&str>) -> bool;
    fn delete_folder(&mut self, id: &str) -> bool;
    fn delete_link(&mut self, id: &str) -> bool;

    fn move_folder_up(&mut self, id: &str) -> bool;
    fn move_folder_down(&mut self, id: &str) -> bool;
    fn move_link_up(&mut self, id: &str) -> bool;
    fn move_link_down(&mut self, id: &str) -> bool;
    fn move_folder(&mut self, id: &str, parent_id: Option<&str>, index: usize) -> Result<(), LinkTreeError>;
    fn move_link(&mut self, id: &str, folder_id: &str, index: usize) -> Result<(), LinkTreeError>;

    fn cut_folder(&mut self, id: &str) -> Result<(), LinkTreeError>;
    fn cut_link(&mut self, id: &str) -> Result<(), LinkTreeError>;
    fn paste(&mut self, target_id: Option<&str>, index: Option<usize>) -> Result<String, LinkTreeError>;
    fn discard_held(&mut self) -> MoveBuffer;
    fn held(&self) -> &MoveBuffer;

    fn sort_all(&mut self);
    fn prune_empty(&mut self) -> usize;

    fn set_search_query(&mut self, query: &str);
    fn search_query(&self) -> &str;
    fn visible_tree(&self) -> Tree;

    fn export_text(&self) -> String;
    fn import_text(&mut self, text: &str) -> Result<usize, LinkTreeError>;
    fn export_json(&self) -> Result<String, LinkTreeError>;
    fn import_json(&mut self, json: &str) -> Result<usize, LinkTreeError>;

    fn bind_file(&mut self, handle: Box<dyn TextFileHandle>);
    fn unbind_file(&mut self) -> Option<Box<dyn TextFileHandle>>;
}

/// Editing session over a [`TreeStore`].
pub struct LinkTreeManager<S: TreeStore> {
    store: S,
    state: DraftState,
    buffer: MoveBuffer,
    query: String,
    file: Option<Box<dyn TextFileHandle>>,
    editor: EditorSettings,
}

impl<S: TreeStore> LinkTreeManager<S> {
    /// Creates a session with an empty draft. Call `load` to read the store.
    pub fn new(store: S) -> Self {
        Self::with_settings(store, EditorSettings::default())
    }

    pub fn with_settings(store: S, editor: EditorSettings) -> Self {
        Self {
            store,
            state: DraftState::default(),
            buffer: MoveBuffer::Empty,
            query: String::new(),
            file: None,
            editor,
        }
    }

    /// The last committed tree.
    pub fn saved_tree(&self) -> &Tree {
        self.state.saved()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Description of the bound file, if saves go to one.
    pub fn bound_file(&self) -> Option<String> {
        self.file.as_ref().map(|f| f.describe())
    }

    /// Reads the raw tree from the bound file, or from the store.
    fn read_current(&self) -> Result<Option<Value>, StorageError> {
        match &self.file {
            Some(file) => {
                let text = file.read_text()?;
                if text.trim().is_empty() {
                    return Ok(None);
                }
                serde_json::from_str(&text)
                    .map(Some)
                    .map_err(|e| StorageError::SerializationError(format!("{}: {}", file.describe(), e)))
            }
            None => self.store.read_persisted(),
        }
    }

    /// Backup rotation followed by the primary write. Bound files skip the
    /// rotation, and so does a stored tree that no longer parses: it is
    /// overwritten without being backed up.
    fn persist(&self, tree: &[FolderNode]) -> Result<(), StorageError> {
        if let Some(file) = &self.file {
            let json = serde_json::to_string_pretty(tree)
                .map_err(|e| StorageError::SerializationError(e.to_string()))?;
            return file.write_text(&json);
        }

        match self.store.read_persisted() {
            Ok(Some(previous)) => self.store.write_backup(&normalize(&previous))?,
            Ok(None) => {}
            Err(StorageError::SerializationError(e)) => {
                log::warn!("stored tree is unreadable, skipping backup: {}", e);
            }
            Err(e) => return Err(e),
        }
        self.store.write_persisted(tree)
    }

    fn ensure_buffer_free(&self) -> Result<(), TreeError> {
        match self.buffer.held_id() {
            Some(id) => Err(TreeError::MoveBufferOccupied(id.to_string())),
            None => Ok(()),
        }
    }

    fn drop_held(&mut self, reason: &str) {
        if let Some(id) = self.buffer.held_id() {
            log::warn!("discarding held node {} ({})", id, reason);
        }
        self.buffer = MoveBuffer::Empty;
    }
}

impl<S: TreeStore> LinkTreeManagerTrait for LinkTreeManager<S> {
    /// Loads the stored tree as both draft and snapshot.
    ///
    /// Returns the number of malformed entries the normalizer dropped. A
    /// stored tree that is not valid JSON at all loads as an empty tree and
    /// counts as one dropped entry; the next save replaces it.
    fn load(&mut self) -> Result<usize, LinkTreeError> {
        let (raw, unreadable) = match self.read_current() {
            Ok(raw) => (raw.unwrap_or(Value::Null), 0),
            Err(StorageError::SerializationError(e)) => {
                log::warn!("stored tree is unreadable, starting empty: {}", e);
                (Value::Null, 1)
            }
            Err(e) => return Err(e.into()),
        };
        let outcome = normalize_with_report(&raw);
        let (folders, links) = tree_stats(&outcome.tree);
        log::info!("loaded {} folders and {} links", folders, links);

        self.state = DraftState::new(outcome.tree);
        self.buffer = MoveBuffer::Empty;
        Ok(outcome.dropped + unreadable)
    }

    /// Commits the draft. On any storage failure the draft and the dirty
    /// flag are left exactly as they were.
    fn save(&mut self) -> Result<(), LinkTreeError> {
        if let Some(id) = self.buffer.held_id() {
            return Err(LinkTreeError::MoveInProgress(id.to_string()));
        }

        let mut tree = self.state.draft().clone();
        if self.editor.prune_on_save {
            tree = tree_ops::prune_empty_folders(&tree);
        }
        if self.editor.sort_on_save {
            tree_ops::sort_tree_in_place(&mut tree);
        }

        if let Err(e) = self.persist(&tree) {
            log::warn!("save failed: {}", e);
            return Err(e.into());
        }

        self.state.replace_draft(tree);
        self.state.commit();
        log::info!("saved link tree");
        Ok(())
    }

    fn cancel(&mut self) {
        self.state.cancel();
        self.buffer = MoveBuffer::Empty;
        log::debug!("discarded draft edits");
    }

    /// Makes the backup the current draft and snapshot, still marked dirty.
    ///
    /// Returns `false` when there is no backup (or it is empty).
    fn restore_from_backup(&mut self) -> Result<bool, LinkTreeError> {
        let Some(raw) = self.store.read_backup()? else {
            log::info!("no backup available");
            return Ok(false);
        };
        let tree = normalize(&raw);
        if tree.is_empty() {
            log::info!("backup is empty");
            return Ok(false);
        }

        self.drop_held("restore");
        self.state.adopt_unconfirmed(tree);
        log::info!("restored tree from backup");
        Ok(true)
    }

    fn is_dirty(&self) -> bool {
        self.state.is_dirty()
    }

    fn tree(&self) -> &Tree {
        self.state.draft()
    }

    // --- Editing ---

    /// Appends a new folder under `parent_id`, or as a new root.
    fn add_folder(&mut self, parent_id: Option<&str>, title: &str) -> Option<String> {
        let folder = FolderNode::new(new_id(), title);
        let id = folder.id.clone();
        let draft = self.state.draft_mut();
        match parent_id {
            None => draft.push(folder),
            Some(pid) => find_folder_mut(draft, pid)?.children.push(folder),
        }
        log::debug!("added folder {}", id);
        Some(id)
    }

    fn add_link(&mut self, folder_id: &str, title: &str, url: &str) -> Option<String> {
        let folder = find_folder_mut(self.state.draft_mut(), folder_id)?;
        let link = LinkEntry::new(new_id(), title, url);
        let id = link.id.clone();
        folder.links.push(link);
        log::debug!("added link {} to {}", id, folder_id);
        Some(id)
    }

    fn rename_folder(&mut self, id: &str, title: &str) -> bool {
        match find_folder_mut(self.state.draft_mut(), id) {
            Some(folder) => {
                folder.title = title.to_string();
                true
            }
            None => false,
        }
    }

    fn update_link(&mut self, id: &str, title: Option<&str>, url: Option<&str>) -> bool {
        let Some(link) = find_link_mut(self.state.draft_mut(), id) else {
            return false;
        };
        if let Some(title) = title {
            link.title = title.to_string();
        }
        if let Some(url) = url {
            link.url = url.to_string();
        }
        true
    }

    /// Removes a folder with everything below it.
    fn delete_folder(&mut self, id: &str) -> bool {
        match tree_index::detach_folder(self.state.draft_mut(), id) {
            Some(folder) => {
                log::debug!(
                    "deleted folder {} ({} links inside)",
                    folder.id,
                    folder.link_count()
                );
                true
            }
            None => false,
        }
    }

    fn delete_link(&mut self, id: &str) -> bool {
        tree_index::detach_link(self.state.draft_mut(), id).is_some()
    }

    // --- Reordering and moves ---

    fn move_folder_up(&mut self, id: &str) -> bool {
        tree_ops::shift_folder(self.state.draft_mut(), id, Shift::Up)
    }

    fn move_folder_down(&mut self, id: &str) -> bool {
        tree_ops::shift_folder(self.state.draft_mut(), id, Shift::Down)
    }

    fn move_link_up(&mut self, id: &str) -> bool {
        tree_ops::shift_link(self.state.draft_mut(), id, Shift::Up)
    }

    fn move_link_down(&mut self, id: &str) -> bool {
        tree_ops::shift_link(self.state.draft_mut(), id, Shift::Down)
    }

    fn move_folder(&mut self, id: &str, parent_id: Option<&str>, index: usize) -> Result<(), LinkTreeError> {
        tree_index::move_folder(self.state.draft_mut(), id, parent_id, index)?;
        log::debug!("moved folder {} under {:?}", id, parent_id);
        Ok(())
    }

    fn move_link(&mut self, id: &str, folder_id: &str, index: usize) -> Result<(), LinkTreeError> {
        tree_index::move_link(self.state.draft_mut(), id, folder_id, index)?;
        log::debug!("moved link {} to {}", id, folder_id);
        Ok(())
    }

    // --- Cut and paste ---

    /// Detaches a folder into the move buffer.
    ///
    /// A held node is already out of the tree, so cutting while the buffer
    /// is occupied (by either kind) fails with `MoveBufferOccupied` instead
    /// of replacing it. Paste or `discard_held` first.
    fn cut_folder(&mut self, id: &str) -> Result<(), LinkTreeError> {
        self.ensure_buffer_free()?;
        let folder = tree_index::detach_folder(self.state.draft_mut(), id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        self.buffer = MoveBuffer::HoldingFolder(folder);
        Ok(())
    }

    /// Detaches a link into the move buffer. Same occupancy rule as
    /// [`cut_folder`](Self::cut_folder).
    fn cut_link(&mut self, id: &str) -> Result<(), LinkTreeError> {
        self.ensure_buffer_free()?;
        let link = tree_index::detach_link(self.state.draft_mut(), id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        self.buffer = MoveBuffer::HoldingLink(link);
        Ok(())
    }

    /// Inserts the held node into `target_id` (folders may also go to the
    /// root with `None`) at `index`, or at the end. A refused paste keeps
    /// the node in the buffer.
    fn paste(&mut self, target_id: Option<&str>, index: Option<usize>) -> Result<String, LinkTreeError> {
        let index = index.unwrap_or(usize::MAX);
        match mem::take(&mut self.buffer) {
            MoveBuffer::Empty => Err(TreeError::MoveBufferEmpty.into()),
            MoveBuffer::HoldingFolder(folder) => {
                let id = folder.id.clone();
                match tree_index::insert_folder(self.state.draft_mut(), target_id, index, folder) {
                    Ok(()) => Ok(id),
                    Err(rejected) => {
                        self.buffer = MoveBuffer::HoldingFolder(rejected.item);
                        Err(rejected.error.into())
                    }
                }
            }
            MoveBuffer::HoldingLink(link) => {
                let Some(folder_id) = target_id else {
                    self.buffer = MoveBuffer::HoldingLink(link);
                    return Err(TreeError::LinkNeedsFolder.into());
                };
                let id = link.id.clone();
                match tree_index::insert_link(self.state.draft_mut(), folder_id, index, link) {
                    Ok(()) => Ok(id),
                    Err(rejected) => {
                        self.buffer = MoveBuffer::HoldingLink(rejected.item);
                        Err(rejected.error.into())
                    }
                }
            }
        }
    }

    /// Empties the buffer and hands back what it held.
    fn discard_held(&mut self) -> MoveBuffer {
        mem::take(&mut self.buffer)
    }

    fn held(&self) -> &MoveBuffer {
        &self.buffer
    }

    // --- Whole-tree operations ---

    fn sort_all(&mut self) {
        tree_ops::sort_tree_in_place(self.state.draft_mut());
    }

    /// Prunes empty folders from the draft. Returns how many were removed.
    fn prune_empty(&mut self) -> usize {
        let (before, _) = tree_stats(self.state.draft());
        let pruned = tree_ops::prune_empty_folders(self.state.draft());
        let (after, _) = tree_stats(&pruned);
        self.state.replace_draft(pruned);
        before - after
    }

    // --- Search ---

    fn set_search_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    fn search_query(&self) -> &str {
        &self.query
    }

    /// The draft as seen through the current search query.
    fn visible_tree(&self) -> Tree {
        filter_tree(self.state.draft(), &self.query)
    }

    // --- Import / export ---

    fn export_text(&self) -> String {
        text_codec::encode(self.state.draft())
    }

    /// Replaces the draft with decoded text. Returns the number of ignored
    /// lines. Text with no folders at all is rejected so a wrong file does
    /// not wipe the draft.
    fn import_text(&mut self, text: &str) -> Result<usize, LinkTreeError> {
        let outcome = text_codec::decode_with_report(text);
        if outcome.tree.is_empty() {
            return Err(LinkTreeError::InvalidImport(
                "no folders found in text".to_string(),
            ));
        }
        self.drop_held("import");
        self.state.replace_draft(outcome.tree);
        log::info!("imported text tree");
        Ok(outcome.skipped_lines)
    }

    fn export_json(&self) -> Result<String, LinkTreeError> {
        serde_json::to_string_pretty(self.state.draft())
            .map_err(|e| StorageError::SerializationError(e.to_string()).into())
    }

    /// Replaces the draft with normalized JSON. Returns the number of
    /// dropped malformed entries.
    fn import_json(&mut self, json: &str) -> Result<usize, LinkTreeError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| LinkTreeError::InvalidImport(e.to_string()))?;
        let outcome = normalize_with_report(&value);
        self.drop_held("import");
        self.state.replace_draft(outcome.tree);
        log::info!("imported json tree");
        Ok(outcome.dropped)
    }

    // --- File binding ---

    fn bind_file(&mut self, handle: Box<dyn TextFileHandle>) {
        log::info!("saving to {}", handle.describe());
        self.file = Some(handle);
    }

    fn unbind_file(&mut self) -> Option<Box<dyn TextFileHandle>> {
        self.file.take()
    }
}
