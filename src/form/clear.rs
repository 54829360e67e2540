use std::sync::{Arc, RwLock};

use indexmap::IndexMap;

use super::error::{FormResult, read_lock, run_all, write_lock};
use crate::id::FieldId;

pub type ClearAction = Arc<dyn Fn() -> FormResult<()> + Send + Sync>;
pub type ValueReader = Arc<dyn Fn() -> FormResult<String> + Send + Sync>;

#[derive(Clone)]
pub struct ValueSource {
    pub name: String,
    pub read: ValueReader,
}

/// Per-field storage that is deliberately outside any notification path:
/// inserting or removing entries never wakes an observer.
///
/// Entries keep mount order, which is the order values are collected in.
pub struct SilentRegistry<V> {
    entries: Arc<RwLock<IndexMap<FieldId, V>>>,
}

impl<V> Clone for SilentRegistry<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<V> Default for SilentRegistry<V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(IndexMap::new())),
        }
    }
}

impl<V: Clone> SilentRegistry<V> {
    pub fn register(&self, id: FieldId, entry: V) -> FormResult<()> {
        write_lock(&self.entries, "registering silent entry")?.insert(id, entry);
        Ok(())
    }

    pub fn unregister(&self, id: FieldId) -> FormResult<bool> {
        Ok(write_lock(&self.entries, "unregistering silent entry")?
            .shift_remove(&id)
            .is_some())
    }

    pub fn contains(&self, id: FieldId) -> FormResult<bool> {
        Ok(read_lock(&self.entries, "checking silent entry")?.contains_key(&id))
    }

    pub fn len(&self) -> FormResult<usize> {
        Ok(read_lock(&self.entries, "counting silent entries")?.len())
    }

    pub fn is_empty(&self) -> FormResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Copies the entries out so callers can invoke them without holding the lock.
    pub fn snapshot(&self) -> FormResult<Vec<(FieldId, V)>> {
        Ok(read_lock(&self.entries, "snapshotting silent entries")?
            .iter()
            .map(|(id, entry)| (*id, entry.clone()))
            .collect())
    }
}

pub type ClearRegistry = SilentRegistry<ClearAction>;
pub type ValueSourceRegistry = SilentRegistry<ValueSource>;

impl SilentRegistry<ClearAction> {
    /// Invokes every registered action and returns how many ran. The list is
    /// snapshotted first so actions may register or unregister entries; an
    /// entry removed mid-sweep is skipped, one added mid-sweep waits for the next.
    pub fn clear_all(&self) -> FormResult<usize> {
        let actions = self.snapshot()?;
        let mut invoked = 0;
        let mut outcomes = Vec::with_capacity(actions.len());
        for (id, action) in actions {
            if !self.contains(id)? {
                continue;
            }
            invoked += 1;
            outcomes.push(action());
        }
        run_all(outcomes)?;
        Ok(invoked)
    }
}
