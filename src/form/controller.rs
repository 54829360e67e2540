use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use super::clear::{ClearRegistry, ValueSourceRegistry};
use super::data::FormData;
use super::dispatch::FormDispatch;
use super::error::{FormResult, read_lock, write_lock};
use super::record::FormRecord;
use super::results::{ResultMap, ResultRegistry};
use super::signal::{Signal, SubscriptionId};
use super::transport::{FormMethod, InMemoryTransport, NativeSubmission, Transport};
use super::trigger::SubmitEvent;
use crate::id::{FieldId, FormId};

const TARGET: &str = "fieldrelay.form";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitPhase {
    Idle,
    AwaitingValidation,
    Submitted,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    /// The record went out before `handle_submit` returned.
    Submitted,
    /// The attempt is parked until every field passes.
    Deferred,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    /// Target of the native fallback submission.
    pub action: String,
    pub method: FormMethod,
    /// Treat a form with no mounted fields as valid. Off by default, so an
    /// empty form can never submit.
    pub allow_empty_submit: bool,
}

pub trait SubmitHandler: Send + Sync {
    fn submit(&self, event: &SubmitEvent, data: FormData) -> FormResult<()>;
}

impl<F> SubmitHandler for F
where
    F: Fn(&SubmitEvent, FormData) -> FormResult<()> + Send + Sync,
{
    fn submit(&self, event: &SubmitEvent, data: FormData) -> FormResult<()> {
        (self)(event, data)
    }
}

struct SubmitState {
    phase: SubmitPhase,
    pending: Option<SubmitEvent>,
    /// Set while the submit signal is being raised; replay waits for it to clear.
    raising_signal: bool,
    attempts: u32,
    submissions: u32,
}

pub(super) struct FormShared {
    id: FormId,
    options: FormOptions,
    pub(super) results: ResultRegistry,
    pub(super) clears: ClearRegistry,
    pub(super) sources: ValueSourceRegistry,
    pub(super) submit_signal: Signal<bool>,
    state: RwLock<SubmitState>,
    handler: RwLock<Option<Arc<dyn SubmitHandler>>>,
    transport: RwLock<Arc<dyn Transport>>,
}

impl FormShared {
    pub(super) fn id(&self) -> FormId {
        self.id
    }

    pub(super) fn is_valid(&self) -> FormResult<bool> {
        self.results.is_valid(self.options.allow_empty_submit)
    }

    pub(super) fn report_result(&self, id: FieldId, passed: bool) -> FormResult<()> {
        let changed = self.results.set_field_result(id, passed)?;
        tracing::trace!(
            target: TARGET,
            op = "result.report",
            form = self.id.get(),
            field = id.get(),
            passed,
            changed,
            "field result reported"
        );
        self.replay_if_ready()?;
        Ok(())
    }

    pub(super) fn remove_result(&self, id: FieldId) -> FormResult<()> {
        if self.results.remove(id)? {
            self.replay_if_ready()?;
        }
        Ok(())
    }

    /// Replays the parked attempt once every field passes. Never runs while the
    /// submit signal is being raised, so an attempt parked by `handle_submit`
    /// completes only after that call returned.
    pub(super) fn replay_if_ready(&self) -> FormResult<bool> {
        if !self.is_valid()? {
            return Ok(false);
        }
        let pending = {
            let mut state = write_lock(&self.state, "taking pending submit")?;
            if state.phase != SubmitPhase::AwaitingValidation || state.raising_signal {
                return Ok(false);
            }
            state.pending.take()
        };
        let Some(event) = pending else {
            return Ok(false);
        };

        tracing::debug!(
            target: TARGET,
            op = "submit.replay",
            form = self.id.get(),
            "validity reached, replaying pending submit"
        );
        self.submit_now(event)?;
        Ok(true)
    }

    pub(super) fn cancel_pending_submit(&self) -> FormResult<bool> {
        let mut state = write_lock(&self.state, "cancelling pending submit")?;
        if state.pending.take().is_none() {
            return Ok(false);
        }
        state.phase = SubmitPhase::Idle;
        tracing::debug!(
            target: TARGET,
            op = "submit.cancel",
            form = self.id.get(),
            "pending submit discarded"
        );
        Ok(true)
    }

    fn handle_submit(&self, event: &mut SubmitEvent) -> FormResult<SubmitOutcome> {
        event.prevent_default();
        {
            let mut state = write_lock(&self.state, "counting submit attempt")?;
            state.attempts = state.attempts.saturating_add(1);
        }

        if self.is_valid()? {
            tracing::debug!(
                target: TARGET,
                op = "submit.immediate",
                form = self.id.get(),
                "form valid, submitting"
            );
            let delivered = self.submit_now(event.clone());
            // Untouched fields still validate when delivery failed.
            let raised = self.raise_submit_signal();
            delivered?;
            raised?;
            return Ok(SubmitOutcome::Submitted);
        }

        {
            let mut state = write_lock(&self.state, "parking submit attempt")?;
            let kept_earlier = state.pending.is_some();
            if !kept_earlier {
                state.pending = Some(event.clone());
            }
            state.phase = SubmitPhase::AwaitingValidation;
            tracing::debug!(
                target: TARGET,
                op = "submit.defer",
                form = self.id.get(),
                kept_earlier,
                "form invalid, submit deferred"
            );
        }
        self.raise_submit_signal()?;
        Ok(SubmitOutcome::Deferred)
    }

    /// Fields that have not validated yet do so now. Their reports may make
    /// the form valid, but the parked attempt waits for the next report or
    /// an explicit replay.
    fn raise_submit_signal(&self) -> FormResult<()> {
        write_lock(&self.state, "holding replay")?.raising_signal = true;
        let raised = self.submit_signal.set(true);
        write_lock(&self.state, "releasing replay")?.raising_signal = false;
        raised.map(drop)
    }

    fn submit_now(&self, event: SubmitEvent) -> FormResult<()> {
        write_lock(&self.state, "entering submitted phase")?.phase = SubmitPhase::Submitted;

        let result = self
            .collect()
            .and_then(|data| self.deliver(&event, data));

        let mut state = write_lock(&self.state, "finishing submit")?;
        match &result {
            Ok(()) => state.submissions = state.submissions.saturating_add(1),
            Err(error) => {
                state.phase = SubmitPhase::Idle;
                tracing::debug!(
                    target: TARGET,
                    op = "submit.failed",
                    form = self.id.get(),
                    %error,
                    "submission failed"
                );
            }
        }
        result
    }

    fn deliver(&self, event: &SubmitEvent, data: FormData) -> FormResult<()> {
        let handler = read_lock(&self.handler, "reading submit handler")?.clone();
        if let Some(handler) = handler {
            return handler.submit(event, data);
        }

        let transport = read_lock(&self.transport, "reading transport")?.clone();
        tracing::debug!(
            target: TARGET,
            op = "submit.native",
            form = self.id.get(),
            action = %self.options.action,
            method = ?self.options.method,
            "no submit handler, using native transport"
        );
        transport.deliver(NativeSubmission::encode(
            &self.options.action,
            self.options.method,
            &data,
        ))
    }

    pub(super) fn collect(&self) -> FormResult<FormData> {
        let mut data = FormData::new();
        for (id, source) in self.sources.snapshot()? {
            let value = (source.read)()?;
            if data.insert(source.name.clone(), value).is_some() {
                tracing::warn!(
                    target: TARGET,
                    op = "submit.collect",
                    form = self.id.get(),
                    field = id.get(),
                    name = %source.name,
                    "duplicate field name, later field wins"
                );
            }
        }
        Ok(data)
    }

    pub(super) fn clear_all(&self) -> FormResult<usize> {
        {
            let mut state = write_lock(&self.state, "resetting submit state")?;
            state.pending = None;
            state.phase = SubmitPhase::Idle;
        }
        self.submit_signal.set(false)?;
        let cleared = self.clears.clear_all()?;
        tracing::debug!(
            target: TARGET,
            op = "form.clear_all",
            form = self.id.get(),
            cleared,
            "form reset"
        );
        Ok(cleared)
    }
}

/// Owns the registries of one form and decides whether and when a submit
/// attempt turns into a submission.
#[derive(Clone)]
pub struct FormController {
    shared: Arc<FormShared>,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new(FormOptions::default())
    }
}

impl FormController {
    pub fn new(options: FormOptions) -> Self {
        Self {
            shared: Arc::new(FormShared {
                id: FormId::next(),
                options,
                results: ResultRegistry::new(),
                clears: ClearRegistry::default(),
                sources: ValueSourceRegistry::default(),
                submit_signal: Signal::new(false),
                state: RwLock::new(SubmitState {
                    phase: SubmitPhase::Idle,
                    pending: None,
                    raising_signal: false,
                    attempts: 0,
                    submissions: 0,
                }),
                handler: RwLock::new(None),
                transport: RwLock::new(Arc::new(InMemoryTransport::new())),
            }),
        }
    }

    pub fn id(&self) -> FormId {
        self.shared.id
    }

    pub fn options(&self) -> &FormOptions {
        &self.shared.options
    }

    /// Handle given to fields and triggers.
    pub fn dispatch(&self) -> FormDispatch {
        FormDispatch::new(self.shared.clone())
    }

    pub fn set_handler(&self, handler: impl SubmitHandler + 'static) -> FormResult<()> {
        *write_lock(&self.shared.handler, "setting submit handler")? = Some(Arc::new(handler));
        Ok(())
    }

    /// Handler that receives the submitted record decoded as `R`.
    pub fn set_record_handler<R, F>(&self, handler: F) -> FormResult<()>
    where
        R: FormRecord + 'static,
        F: Fn(&SubmitEvent, R) -> FormResult<()> + Send + Sync + 'static,
    {
        self.set_handler(move |event: &SubmitEvent, data: FormData| -> FormResult<()> {
            handler(event, data.decode::<R>()?)
        })
    }

    pub fn clear_handler(&self) -> FormResult<()> {
        *write_lock(&self.shared.handler, "clearing submit handler")? = None;
        Ok(())
    }

    pub fn set_transport(&self, transport: impl Transport) -> FormResult<()> {
        *write_lock(&self.shared.transport, "setting transport")? = Arc::new(transport);
        Ok(())
    }

    /// Entry point for a submit event bubbling up to the form boundary.
    ///
    /// The event's default action is always prevented. A valid form submits
    /// immediately; otherwise the attempt is parked (the first parked attempt
    /// wins) and replayed by a later report that finds the form valid, unless
    /// a field regains focus first. A parked attempt never completes inside
    /// this call.
    pub fn handle_submit(&self, event: &mut SubmitEvent) -> FormResult<SubmitOutcome> {
        self.shared.handle_submit(event)
    }

    pub fn submit(&self) -> FormResult<SubmitOutcome> {
        self.handle_submit(&mut SubmitEvent::new())
    }

    pub fn cancel_pending_submit(&self) -> FormResult<bool> {
        self.shared.cancel_pending_submit()
    }

    /// Deferred step for hosts that settle after each event: submits the
    /// parked attempt if the form became valid in the meantime. Returns
    /// whether a submission went out.
    pub fn replay_pending(&self) -> FormResult<bool> {
        self.shared.replay_if_ready()
    }

    /// Resets every mounted field, drops any parked attempt and lowers the
    /// submit signal. Returns how many fields were reset.
    pub fn clear_all(&self) -> FormResult<usize> {
        self.shared.clear_all()
    }

    pub fn collect(&self) -> FormResult<FormData> {
        self.shared.collect()
    }

    pub fn is_valid(&self) -> FormResult<bool> {
        self.shared.is_valid()
    }

    pub fn results(&self) -> FormResult<ResultMap> {
        self.shared.results.snapshot()
    }

    pub fn field_count(&self) -> FormResult<usize> {
        Ok(self.results()?.len())
    }

    pub fn submit_signal(&self) -> FormResult<bool> {
        self.shared.submit_signal.get()
    }

    pub fn submit_phase(&self) -> FormResult<SubmitPhase> {
        Ok(read_lock(&self.shared.state, "reading submit phase")?.phase)
    }

    pub fn has_pending_submit(&self) -> FormResult<bool> {
        Ok(read_lock(&self.shared.state, "reading pending submit")?
            .pending
            .is_some())
    }

    pub fn attempt_count(&self) -> FormResult<u32> {
        Ok(read_lock(&self.shared.state, "reading attempt count")?.attempts)
    }

    pub fn submission_count(&self) -> FormResult<u32> {
        Ok(read_lock(&self.shared.state, "reading submission count")?.submissions)
    }

    /// Observes the result channel. Only pass/fail changes notify; mounting
    /// bookkeeping for clear actions and value sources never does.
    pub fn on_results_change(
        &self,
        listener: impl Fn(&ResultMap) -> FormResult<()> + Send + Sync + 'static,
    ) -> FormResult<SubscriptionId> {
        self.shared.results.subscribe(listener)
    }

    pub fn remove_results_listener(&self, id: SubscriptionId) -> FormResult<bool> {
        self.shared.results.unsubscribe(id)
    }
}
