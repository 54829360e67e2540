use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::error::{FormResult, read_lock, run_all, write_lock};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SubscriptionId(u64);

pub type Listener<T> = Arc<dyn Fn(&T) -> FormResult<()> + Send + Sync>;

struct SignalState<T> {
    value: T,
    next_subscription: u64,
    listeners: BTreeMap<SubscriptionId, Listener<T>>,
}

/// Shared value that notifies its subscribers whenever it is replaced.
///
/// Listeners run after the internal lock is released, so a listener may read
/// or write the same signal again.
pub struct Signal<T> {
    state: Arc<RwLock<SignalState<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(value: T) -> Self {
        Self {
            state: Arc::new(RwLock::new(SignalState {
                value,
                next_subscription: 1,
                listeners: BTreeMap::new(),
            })),
        }
    }

    pub fn get(&self) -> FormResult<T> {
        Ok(read_lock(&self.state, "reading signal value")?.value.clone())
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&T) -> FormResult<()> + Send + Sync + 'static,
    ) -> FormResult<SubscriptionId> {
        let mut state = write_lock(&self.state, "subscribing to signal")?;
        let id = SubscriptionId(state.next_subscription);
        state.next_subscription += 1;
        state.listeners.insert(id, Arc::new(listener));
        Ok(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> FormResult<bool> {
        Ok(write_lock(&self.state, "unsubscribing from signal")?
            .listeners
            .remove(&id)
            .is_some())
    }

    pub fn subscriber_count(&self) -> FormResult<usize> {
        Ok(read_lock(&self.state, "counting signal subscribers")?
            .listeners
            .len())
    }

    /// Computes a replacement from the current value. Returning `None` leaves
    /// the value untouched and notifies nobody.
    pub fn update(&self, f: impl FnOnce(&T) -> Option<T>) -> FormResult<bool> {
        let (value, listeners) = {
            let mut state = write_lock(&self.state, "updating signal value")?;
            let Some(next) = f(&state.value) else {
                return Ok(false);
            };
            state.value = next;
            (
                state.value.clone(),
                state.listeners.values().cloned().collect::<Vec<_>>(),
            )
        };
        run_all(listeners.iter().map(|listener| listener(&value)))?;
        Ok(true)
    }
}

impl<T> Signal<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Stores `value` and notifies subscribers if it differs from the current one.
    pub fn set(&self, value: T) -> FormResult<bool> {
        self.update(|current| (*current != value).then_some(value))
    }
}
