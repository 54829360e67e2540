use std::sync::Arc;

use super::clear::{ClearAction, ValueReader, ValueSource};
use super::controller::FormShared;
use super::error::FormResult;
use super::signal::SubscriptionId;
use crate::id::{FieldId, FormId};

/// The surface a form exposes to its fields and triggers.
///
/// Fields only touch their own entries through these calls and never see
/// another field's clear action or value source.
#[derive(Clone)]
pub struct FormDispatch {
    shared: Arc<FormShared>,
}

impl FormDispatch {
    pub(super) fn new(shared: Arc<FormShared>) -> Self {
        Self { shared }
    }

    pub fn form_id(&self) -> FormId {
        self.shared.id()
    }

    /// Records a field's pass/fail outcome. May replay a parked submit.
    pub fn report_result(&self, id: FieldId, passed: bool) -> FormResult<()> {
        self.shared.report_result(id, passed)
    }

    /// Drops a field's outcome when it unmounts. May replay a parked submit if
    /// the removed field was the last one failing.
    pub fn remove_result(&self, id: FieldId) -> FormResult<()> {
        self.shared.remove_result(id)
    }

    pub fn register_clear(
        &self,
        id: FieldId,
        action: impl Fn() -> FormResult<()> + Send + Sync + 'static,
    ) -> FormResult<()> {
        let action: ClearAction = Arc::new(action);
        self.shared.clears.register(id, action)
    }

    pub fn unregister_clear(&self, id: FieldId) -> FormResult<bool> {
        self.shared.clears.unregister(id)
    }

    /// Registers how to read a field's value at submit time.
    pub fn register_value_source(
        &self,
        id: FieldId,
        name: impl Into<String>,
        read: impl Fn() -> FormResult<String> + Send + Sync + 'static,
    ) -> FormResult<()> {
        let read: ValueReader = Arc::new(read);
        self.shared.sources.register(
            id,
            ValueSource {
                name: name.into(),
                read,
            },
        )
    }

    pub fn unregister_value_source(&self, id: FieldId) -> FormResult<bool> {
        self.shared.sources.unregister(id)
    }

    /// Idempotent: with nothing parked this does nothing.
    pub fn cancel_pending_submit(&self) -> FormResult<bool> {
        self.shared.cancel_pending_submit()
    }

    pub fn submit_signal(&self) -> FormResult<bool> {
        self.shared.submit_signal.get()
    }

    pub fn watch_submit_signal(
        &self,
        listener: impl Fn(&bool) -> FormResult<()> + Send + Sync + 'static,
    ) -> FormResult<SubscriptionId> {
        self.shared.submit_signal.subscribe(listener)
    }

    pub fn unwatch_submit_signal(&self, id: SubscriptionId) -> FormResult<bool> {
        self.shared.submit_signal.unsubscribe(id)
    }

    /// The form's aggregate reset action.
    pub fn clear_all(&self) -> FormResult<usize> {
        self.shared.clear_all()
    }
}
