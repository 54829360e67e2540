use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, Weak};

use super::binding::ValueBinding;
use super::dispatch::FormDispatch;
use super::error::{FormResult, read_lock, run_all, write_lock};
use super::signal::SubscriptionId;
use super::validation::{AsyncValidator, BeforeValidate, SharedValidator, Validation, Validator};
use crate::id::{FieldId, auto_field_name};

const TARGET: &str = "fieldrelay.form";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RevalidateMode {
    /// Validate only on blur and on the submit signal.
    #[default]
    OnBlur,
    /// Additionally validate on every edit once the field has validated once.
    OnChange,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueMode {
    /// The value lives in an outside [`ValueBinding`]; edits are reported into it.
    Controlled,
    /// The value lives inside the field.
    Uncontrolled,
}

#[derive(Clone)]
pub struct FieldOptions {
    name: String,
    call_site: Option<&'static Location<'static>>,
    required: bool,
    required_message: String,
    initial_value: String,
    binding: Option<ValueBinding>,
    sync_with: Option<ValueBinding>,
    validator: Option<SharedValidator>,
    before_validate: Option<BeforeValidate>,
    revalidate: RevalidateMode,
}

impl FieldOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            call_site: None,
            required: false,
            required_message: "This field is required".to_string(),
            initial_value: String::new(),
            binding: None,
            sync_with: None,
            validator: None,
            before_validate: None,
            revalidate: RevalidateMode::default(),
        }
    }

    /// Options for a field without an explicit name. The name is derived at
    /// mount from the form and this call site.
    #[track_caller]
    pub fn anonymous() -> Self {
        Self {
            call_site: Some(Location::caller()),
            ..Self::new(String::new())
        }
    }

    pub fn required(mut self, value: bool) -> Self {
        self.required = value;
        self
    }

    pub fn required_message(mut self, message: impl Into<String>) -> Self {
        self.required_message = message.into();
        self
    }

    /// Starting value of an uncontrolled field. Ignored when controlled.
    pub fn initial_value(mut self, value: impl Into<String>) -> Self {
        self.initial_value = value.into();
        self
    }

    /// Makes the field controlled by `binding` for its whole lifetime.
    pub fn controlled(mut self, binding: ValueBinding) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Mirrors `source` into the field's local value.
    pub fn sync_with(mut self, source: ValueBinding) -> Self {
        self.sync_with = Some(source);
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn before_validate(
        mut self,
        normalize: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.before_validate = Some(Arc::new(normalize));
        self
    }

    pub fn revalidate(mut self, mode: RevalidateMode) -> Self {
        self.revalidate = mode;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldSnapshot {
    pub value: String,
    pub valid: bool,
    pub messages: Vec<String>,
    pub validated: bool,
}

struct FieldState {
    local_value: String,
    valid: bool,
    messages: Vec<String>,
    validated: bool,
}

struct FieldShared {
    id: FieldId,
    name: String,
    required: bool,
    required_message: String,
    binding: Option<ValueBinding>,
    validator: Option<SharedValidator>,
    before_validate: Option<BeforeValidate>,
    revalidate: RevalidateMode,
    dispatch: FormDispatch,
    mounted: AtomicBool,
    state: RwLock<FieldState>,
}

impl FieldShared {
    fn value(&self) -> FormResult<String> {
        match &self.binding {
            Some(binding) => binding.get(),
            None => Ok(read_lock(&self.state, "reading field value")?
                .local_value
                .clone()),
        }
    }

    fn normalized_value(&self) -> FormResult<String> {
        let raw = self.value()?;
        Ok(match &self.before_validate {
            Some(normalize) => normalize(&raw),
            None => raw,
        })
    }

    /// Blank required fields fail with the required message alone; the rule
    /// only runs on values that got past that check.
    fn required_check(&self, value: &str) -> Option<Validation> {
        (self.required && value.trim().is_empty())
            .then(|| Validation::fail(self.required_message.clone()))
    }

    fn validate(&self) -> FormResult<bool> {
        let value = self.normalized_value()?;
        let outcome = match self.required_check(&value) {
            Some(failed) => failed,
            None => match &self.validator {
                Some(validator) => Validator::validate(validator.as_ref(), &value),
                None => Validation::pass(),
            },
        };
        self.apply(outcome)
    }

    async fn validate_async<V>(&self, rule: &V) -> FormResult<bool>
    where
        V: AsyncValidator,
    {
        let value = self.normalized_value()?;
        let outcome = match self.required_check(&value) {
            Some(failed) => failed,
            None => AsyncValidator::validate(rule, &value).await,
        };
        self.apply(outcome)
    }

    fn apply(&self, outcome: Validation) -> FormResult<bool> {
        let passed = outcome.passed;
        {
            let mut state = write_lock(&self.state, "storing validation outcome")?;
            state.valid = passed;
            state.messages = outcome.messages;
            state.validated = true;
        }
        if self.mounted.load(Ordering::SeqCst) {
            self.dispatch.report_result(self.id, passed)?;
        }
        Ok(passed)
    }

    fn input(&self, value: String) -> FormResult<()> {
        let validated = match &self.binding {
            Some(binding) => {
                binding.set(value)?;
                read_lock(&self.state, "reading validated flag")?.validated
            }
            None => {
                let mut state = write_lock(&self.state, "writing field value")?;
                state.local_value = value;
                state.validated
            }
        };
        if validated && self.revalidate == RevalidateMode::OnChange {
            self.validate()?;
        }
        Ok(())
    }

    fn sync_from(&self, value: &str) -> FormResult<()> {
        write_lock(&self.state, "mirroring synced value")?.local_value = value.to_string();
        Ok(())
    }

    fn on_submit_signal(&self, raised: bool) -> FormResult<()> {
        if !raised || !self.mounted.load(Ordering::SeqCst) {
            return Ok(());
        }
        let validated = read_lock(&self.state, "reading validated flag")?.validated;
        if !validated {
            self.validate()?;
        }
        Ok(())
    }

    /// Back to an empty value with no messages and the not-required default
    /// outcome. A field that already unmounted ignores the call.
    fn reset(&self) -> FormResult<()> {
        if !self.mounted.load(Ordering::SeqCst) {
            return Ok(());
        }
        let default_outcome = !self.required;
        {
            let mut state = write_lock(&self.state, "resetting field")?;
            state.local_value.clear();
            state.messages.clear();
            state.valid = default_outcome;
            state.validated = false;
        }
        if let Some(binding) = &self.binding {
            binding.set(String::new())?;
        }
        self.dispatch.report_result(self.id, default_outcome)
    }
}

/// Controller for one mounted field.
///
/// Mounting registers the field with its form; dropping the controller (or
/// calling [`FieldController::unmount`]) removes every trace of it, so a
/// removed field never counts toward validity and is never reset again.
pub struct FieldController {
    shared: Arc<FieldShared>,
    signal_subscription: Option<SubscriptionId>,
    sync_source: Option<(ValueBinding, SubscriptionId)>,
}

impl FieldController {
    pub fn mount(dispatch: &FormDispatch, options: FieldOptions) -> FormResult<Self> {
        let id = FieldId::next();
        let local_value = match &options.sync_with {
            Some(source) => source.get()?,
            None => options.initial_value.clone(),
        };
        let default_outcome = !options.required;
        let name = match options.call_site {
            Some(site) => auto_field_name(dispatch.form_id(), site),
            None => options.name,
        };

        let mut field = Self {
            shared: Arc::new(FieldShared {
                id,
                name,
                required: options.required,
                required_message: options.required_message,
                binding: options.binding,
                validator: options.validator,
                before_validate: options.before_validate,
                revalidate: options.revalidate,
                dispatch: dispatch.clone(),
                mounted: AtomicBool::new(true),
                state: RwLock::new(FieldState {
                    local_value,
                    valid: default_outcome,
                    messages: Vec::new(),
                    validated: false,
                }),
            }),
            signal_subscription: None,
            sync_source: None,
        };
        let weak = Arc::downgrade(&field.shared);

        // Any early return below drops `field`, which unregisters whatever was
        // registered so far.
        dispatch.register_clear(id, {
            let weak = weak.clone();
            move || with_field(&weak, (), |field| field.reset())
        })?;
        dispatch.register_value_source(id, field.shared.name.clone(), {
            let weak = weak.clone();
            move || with_field(&weak, String::new(), |field| field.value())
        })?;

        // Mounted after a submit attempt: report the rule's outcome, never the default.
        if dispatch.submit_signal()? {
            field.shared.validate()?;
        } else {
            dispatch.report_result(id, default_outcome)?;
        }

        if let Some(source) = options.sync_with {
            let subscription = source.subscribe({
                let weak = weak.clone();
                move |value| with_field(&weak, (), |field| field.sync_from(value))
            })?;
            field.sync_source = Some((source, subscription));
        }
        field.signal_subscription = Some(dispatch.watch_submit_signal({
            let weak = weak.clone();
            move |raised| with_field(&weak, (), |field| field.on_submit_signal(*raised))
        })?);

        tracing::debug!(
            target: TARGET,
            op = "field.mount",
            form = dispatch.form_id().get(),
            field = id.get(),
            name = %field.shared.name,
            controlled = field.shared.binding.is_some(),
            required = field.shared.required,
            "field mounted"
        );
        Ok(field)
    }

    pub fn id(&self) -> FieldId {
        self.shared.id
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn is_required(&self) -> bool {
        self.shared.required
    }

    pub fn mode(&self) -> ValueMode {
        if self.shared.binding.is_some() {
            ValueMode::Controlled
        } else {
            ValueMode::Uncontrolled
        }
    }

    /// Displayed value: the binding's value when controlled, otherwise the
    /// local value (which `sync_with` keeps mirrored).
    pub fn value(&self) -> FormResult<String> {
        self.shared.value()
    }

    pub fn is_valid(&self) -> FormResult<bool> {
        Ok(read_lock(&self.shared.state, "reading field validity")?.valid)
    }

    pub fn messages(&self) -> FormResult<Vec<String>> {
        Ok(read_lock(&self.shared.state, "reading field messages")?
            .messages
            .clone())
    }

    pub fn has_validated(&self) -> FormResult<bool> {
        Ok(read_lock(&self.shared.state, "reading validated flag")?.validated)
    }

    pub fn snapshot(&self) -> FormResult<FieldSnapshot> {
        let value = self.value()?;
        let state = read_lock(&self.shared.state, "creating field snapshot")?;
        Ok(FieldSnapshot {
            value,
            valid: state.valid,
            messages: state.messages.clone(),
            validated: state.validated,
        })
    }

    /// User edit. Controlled fields report it into their binding.
    pub fn input(&self, value: impl Into<String>) -> FormResult<()> {
        self.shared.input(value.into())
    }

    /// Focus discards any parked submit so the form never submits while the
    /// user is still editing.
    pub fn focus(&self) -> FormResult<bool> {
        self.shared.dispatch.cancel_pending_submit()
    }

    pub fn blur(&self) -> FormResult<bool> {
        self.shared.validate()
    }

    pub fn validate(&self) -> FormResult<bool> {
        self.shared.validate()
    }

    /// Runs an awaiting rule to completion, then reports like [`Self::validate`].
    pub async fn validate_async<V>(&self, rule: &V) -> FormResult<bool>
    where
        V: AsyncValidator,
    {
        self.shared.validate_async(rule).await
    }

    pub fn reset(&self) -> FormResult<()> {
        self.shared.reset()
    }

    pub fn unmount(mut self) -> FormResult<()> {
        self.detach()
    }

    fn detach(&mut self) -> FormResult<()> {
        if !self.shared.mounted.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        let id = self.shared.id;
        let signal_subscription = self.signal_subscription.take();
        let sync_source = self.sync_source.take();

        let result = run_all([
            signal_subscription.map_or(Ok(()), |subscription| {
                self.shared.dispatch.unwatch_submit_signal(subscription).map(drop)
            }),
            sync_source.map_or(Ok(()), |(source, subscription)| {
                source.unsubscribe(subscription).map(drop)
            }),
            self.shared.dispatch.unregister_clear(id).map(drop),
            self.shared.dispatch.unregister_value_source(id).map(drop),
            self.shared.dispatch.remove_result(id),
        ]);

        tracing::debug!(
            target: TARGET,
            op = "field.unmount",
            form = self.shared.dispatch.form_id().get(),
            field = id.get(),
            name = %self.shared.name,
            ok = result.is_ok(),
            "field unmounted"
        );
        result
    }
}

impl Drop for FieldController {
    fn drop(&mut self) {
        if let Err(error) = self.detach() {
            tracing::warn!(
                target: TARGET,
                op = "field.unmount",
                field = self.shared.id.get(),
                %error,
                "field cleanup failed"
            );
        }
    }
}

fn with_field<T>(
    weak: &Weak<FieldShared>,
    gone: T,
    f: impl FnOnce(&FieldShared) -> FormResult<T>,
) -> FormResult<T> {
    match weak.upgrade() {
        Some(field) => f(&field),
        None => Ok(gone),
    }
}
