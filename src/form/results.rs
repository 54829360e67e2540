use std::collections::BTreeMap;
use std::sync::Arc;

use super::error::FormResult;
use super::signal::{Signal, SubscriptionId};
use crate::id::FieldId;

/// Immutable view of every mounted field's last reported outcome.
pub type ResultMap = Arc<BTreeMap<FieldId, bool>>;

/// An empty map is invalid unless `allow_empty` opts into vacuous validity.
pub fn aggregate_validity(results: &BTreeMap<FieldId, bool>, allow_empty: bool) -> bool {
    if results.is_empty() {
        return allow_empty;
    }
    results.values().all(|passed| *passed)
}

/// Field pass/fail table. Every change swaps in a fresh map and notifies
/// observers; aggregate validity is always derived from the current map.
#[derive(Clone)]
pub struct ResultRegistry {
    results: Signal<ResultMap>,
}

impl Default for ResultRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultRegistry {
    pub fn new() -> Self {
        Self {
            results: Signal::new(Arc::new(BTreeMap::new())),
        }
    }

    /// Merges one entry into a new map. Reporting the value already stored is
    /// a no-op and notifies nobody.
    pub fn set_field_result(&self, id: FieldId, passed: bool) -> FormResult<bool> {
        self.results.update(|current| {
            if current.get(&id) == Some(&passed) {
                return None;
            }
            let mut next = BTreeMap::clone(current);
            next.insert(id, passed);
            Some(Arc::new(next))
        })
    }

    pub fn remove(&self, id: FieldId) -> FormResult<bool> {
        self.results.update(|current| {
            if !current.contains_key(&id) {
                return None;
            }
            let mut next = BTreeMap::clone(current);
            next.remove(&id);
            Some(Arc::new(next))
        })
    }

    pub fn snapshot(&self) -> FormResult<ResultMap> {
        self.results.get()
    }

    pub fn is_valid(&self, allow_empty: bool) -> FormResult<bool> {
        let results = self.snapshot()?;
        Ok(aggregate_validity(results.as_ref(), allow_empty))
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&ResultMap) -> FormResult<()> + Send + Sync + 'static,
    ) -> FormResult<SubscriptionId> {
        self.results.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> FormResult<bool> {
        self.results.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_is_invalid_by_default() {
        let registry = ResultRegistry::new();
        assert!(!registry.is_valid(false).expect("validity"));
        assert!(registry.is_valid(true).expect("vacuous validity"));
    }

    #[test]
    fn validity_requires_every_entry_to_pass() {
        let registry = ResultRegistry::new();
        let first = FieldId::next();
        let second = FieldId::next();

        registry.set_field_result(first, true).expect("first");
        assert!(registry.is_valid(false).expect("one passing"));

        registry.set_field_result(second, false).expect("second");
        assert!(!registry.is_valid(false).expect("one failing"));

        registry.set_field_result(second, true).expect("second fixed");
        assert!(registry.is_valid(false).expect("all passing"));
    }

    #[test]
    fn removing_an_entry_restores_prior_validity() {
        let registry = ResultRegistry::new();
        let kept = FieldId::next();
        let removed = FieldId::next();

        registry.set_field_result(kept, true).expect("kept");
        let before = registry.is_valid(false).expect("before");

        registry.set_field_result(removed, false).expect("removed");
        assert!(!registry.is_valid(false).expect("during"));

        assert!(registry.remove(removed).expect("remove"));
        assert_eq!(registry.is_valid(false).expect("after"), before);
        assert!(!registry.remove(removed).expect("second remove"));
    }

    #[test]
    fn every_change_produces_a_new_map() {
        let registry = ResultRegistry::new();
        let id = FieldId::next();
        let empty = registry.snapshot().expect("empty");

        registry.set_field_result(id, false).expect("set");
        let first = registry.snapshot().expect("first");
        assert!(!Arc::ptr_eq(&empty, &first));
        assert!(empty.is_empty());

        registry.set_field_result(id, false).expect("same value");
        assert!(Arc::ptr_eq(&first, &registry.snapshot().expect("unchanged")));

        registry.set_field_result(id, true).expect("flip");
        assert!(!Arc::ptr_eq(&first, &registry.snapshot().expect("flipped")));
        assert_eq!(first.get(&id), Some(&false));
    }
}
