use super::error::FormResult;
use super::signal::{Signal, SubscriptionId};

/// A field value owned outside the field.
///
/// Controlled fields read from and report edits into a binding. A binding can
/// also be handed to another field as `sync_with`, which mirrors it into that
/// field's displayed value without making the mirror controlled.
#[derive(Clone)]
pub struct ValueBinding {
    value: Signal<String>,
}

impl ValueBinding {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            value: Signal::new(initial.into()),
        }
    }

    pub fn get(&self) -> FormResult<String> {
        self.value.get()
    }

    /// Replaces the owned value, waking mirrors only when it actually changes.
    pub fn set(&self, value: impl Into<String>) -> FormResult<bool> {
        self.value.set(value.into())
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&str) -> FormResult<()> + Send + Sync + 'static,
    ) -> FormResult<SubscriptionId> {
        self.value.subscribe(move |value: &String| listener(value))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> FormResult<bool> {
        self.value.unsubscribe(id)
    }
}

impl Default for ValueBinding {
    fn default() -> Self {
        Self::new(String::new())
    }
}
