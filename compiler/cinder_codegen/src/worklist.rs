//! Declarations whose emission has been deferred.
//!
//! A declaration is keyed by its canonical declaration, is pending at most
//! once and is never scheduled again after it has been emitted.

use cinder_ast::DeclId;
use rustc_hash::FxHashSet;

#[derive(Debug, Default)]
pub struct Worklist {
    pending: Vec<DeclId>,
    pending_set: FxHashSet<DeclId>,
    emitted: FxHashSet<DeclId>,
    vtables: Vec<DeclId>,
    lazy: FxHashSet<DeclId>,
}

impl Worklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `decl` unless it is already pending or emitted. Returns whether
    /// it was queued.
    pub fn schedule(&mut self, decl: DeclId) -> bool {
        if self.emitted.contains(&decl) || !self.pending_set.insert(decl) {
            return false;
        }
        tracing::trace!(?decl, "scheduled for deferred emission");
        self.pending.push(decl);
        true
    }

    pub fn mark_emitted(&mut self, decl: DeclId) {
        self.emitted.insert(decl);
        self.lazy.remove(&decl);
    }

    pub fn is_emitted(&self, decl: DeclId) -> bool {
        self.emitted.contains(&decl)
    }

    pub fn is_pending(&self, decl: DeclId) -> bool {
        self.pending_set.contains(&decl)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Queue the virtual table of a polymorphic record.
    pub fn defer_vtable(&mut self, record: DeclId) {
        if !self.vtables.contains(&record) {
            self.vtables.push(record);
        }
    }

    pub fn deferred_vtables(&self) -> &[DeclId] {
        &self.vtables
    }

    /// Remove and return every pending declaration in scheduling order.
    pub fn take_pending(&mut self) -> Vec<DeclId> {
        self.pending_set.clear();
        std::mem::take(&mut self.pending)
    }

    /// Record a definition that is emitted only once something refers to it.
    pub fn add_lazy_candidate(&mut self, decl: DeclId) {
        if !self.emitted.contains(&decl) {
            self.lazy.insert(decl);
        }
    }

    pub fn is_lazy_candidate(&self, decl: DeclId) -> bool {
        self.lazy.contains(&decl)
    }

    pub fn emitted_count(&self) -> usize {
        self.emitted.len()
    }
}
