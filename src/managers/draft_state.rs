//! Draft/snapshot bookkeeping for one editing session.
//!
//! The draft is what the user edits; the snapshot is the last committed
//! state. Dirtiness is computed by comparing the two, plus an explicit flag
//! for states that were adopted without confirmation (a restored backup).

use crate::types::link_tree::Tree;

#[derive(Debug, Clone, Default)]
pub struct DraftState {
    draft: Tree,
    saved: Tree,
    unconfirmed: bool,
}

impl DraftState {
    /// Starts a session where draft and snapshot are both `tree`.
    pub fn new(tree: Tree) -> Self {
        Self {
            saved: tree.clone(),
            draft: tree,
            unconfirmed: false,
        }
    }

    pub fn draft(&self) -> &Tree {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Tree {
        &mut self.draft
    }

    pub fn saved(&self) -> &Tree {
        &self.saved
    }

    /// True when the draft differs from the snapshot, or holds an
    /// adopted state nobody has confirmed yet.
    pub fn is_dirty(&self) -> bool {
        self.unconfirmed || self.draft != self.saved
    }

    /// Replaces the draft; the snapshot stays, so dirtiness follows from the diff.
    pub fn replace_draft(&mut self, tree: Tree) {
        self.draft = tree;
    }

    /// Sets both draft and snapshot to `tree` but keeps the session dirty
    /// until the next commit or cancel.
    pub fn adopt_unconfirmed(&mut self, tree: Tree) {
        self.saved = tree.clone();
        self.draft = tree;
        self.unconfirmed = true;
    }

    /// Call only after the persistence write succeeded.
    pub fn commit(&mut self) {
        self.saved = self.draft.clone();
        self.unconfirmed = false;
    }

    /// Throws away every edit since the last commit.
    pub fn cancel(&mut self) {
        self.draft = self.saved.clone();
        self.unconfirmed = false;
    }
}
