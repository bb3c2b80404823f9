//! Per-request change tracking.
//!
//! Repository reads and stagings hand out [`Tracked`] handles and record
//! them in a [`ChangeTracker`]. Committing drains the tracker into
//! [`PendingChange`]s; a loaded entity is written back only if it differs
//! from the snapshot taken when it was read.

use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared, mutable handle to an entity owned by a change tracker.
///
/// Clones point at the same entity; identity is pointer identity.
#[derive(Debug)]
pub struct Tracked<T>(Arc<RwLock<T>>);

impl<T> Tracked<T> {
    pub fn new(entity: T) -> Self {
        Self(Arc::new(RwLock::new(entity)))
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().await
    }

    pub fn same_entity(&self, other: &Tracked<T>) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Clone> Tracked<T> {
    /// Copy of the current state
    pub async fn snapshot(&self) -> T {
        self.0.read().await.clone()
    }
}

impl<T> Clone for Tracked<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

#[derive(Debug)]
enum EntryState<T> {
    Added,
    Loaded { original: T },
    Deleted,
}

#[derive(Debug)]
pub struct Entry<T> {
    entity: Tracked<T>,
    state: EntryState<T>,
}

/// A write the store must perform at commit.
#[derive(Debug)]
pub enum PendingChange<T> {
    /// The store assigns the identifier and writes it back into the handle
    Insert(Tracked<T>),
    Update(Tracked<T>),
    Delete(T),
}

impl<T: Clone + PartialEq> Entry<T> {
    /// `None` for a loaded entity that was never modified
    pub async fn into_change(self) -> Option<PendingChange<T>> {
        match self.state {
            EntryState::Added => Some(PendingChange::Insert(self.entity)),
            EntryState::Deleted => Some(PendingChange::Delete(self.entity.snapshot().await)),
            EntryState::Loaded { original } => {
                let modified = *self.entity.read().await != original;
                modified.then_some(PendingChange::Update(self.entity))
            }
        }
    }
}

/// Registry of the entities a single request has read, added or removed.
#[derive(Debug)]
pub struct ChangeTracker<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Default for ChangeTracker<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Clone> ChangeTracker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track an entity read from the store
    pub fn attach(&mut self, entity: T) -> Tracked<T> {
        let original = entity.clone();
        let tracked = Tracked::new(entity);
        self.entries.push(Entry {
            entity: tracked.clone(),
            state: EntryState::Loaded { original },
        });
        tracked
    }

    /// Stage a new entity for insertion
    pub fn add(&mut self, entity: T) -> Tracked<T> {
        let tracked = Tracked::new(entity);
        self.entries.push(Entry {
            entity: tracked.clone(),
            state: EntryState::Added,
        });
        tracked
    }

    /// Stage removal. Removing an entity that was only added un-stages it.
    pub fn remove(&mut self, entity: &Tracked<T>) {
        match self
            .entries
            .iter()
            .position(|entry| entry.entity.same_entity(entity))
        {
            Some(index) if matches!(self.entries[index].state, EntryState::Added) => {
                self.entries.remove(index);
            }
            Some(index) => self.entries[index].state = EntryState::Deleted,
            None => self.entries.push(Entry {
                entity: entity.clone(),
                state: EntryState::Deleted,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take every entry, leaving the tracker empty
    pub fn drain(&mut self) -> Vec<Entry<T>> {
        std::mem::take(&mut self.entries)
    }
}

/// Resolve drained entries into the writes a commit has to perform.
pub async fn pending_changes<T: Clone + PartialEq>(entries: Vec<Entry<T>>) -> Vec<PendingChange<T>> {
    let mut changes = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Some(change) = entry.into_change().await {
            changes.push(change);
        }
    }
    changes
}
