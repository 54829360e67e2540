use super::controller::{FormController, SubmitOutcome};
use super::dispatch::FormDispatch;
use super::error::FormResult;

/// Native `type` of a button inside a form.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ButtonKind {
    /// No default action.
    Button,
    Submit,
    Reset,
}

/// Submit event as it reaches the form boundary.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SubmitEvent {
    submitter: Option<String>,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_submitter(name: impl Into<String>) -> Self {
        Self {
            submitter: Some(name.into()),
            default_prevented: false,
        }
    }

    pub fn submitter(&self) -> Option<&str> {
        self.submitter.as_deref()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Button bound to the form's aggregate clear action.
///
/// It is a plain `Button`, never a native `Reset`: native reset would restore
/// element state on its own and drift from the field controllers.
#[derive(Clone)]
pub struct ResetTrigger {
    dispatch: FormDispatch,
}

impl ResetTrigger {
    pub fn new(dispatch: FormDispatch) -> Self {
        Self { dispatch }
    }

    pub fn kind(&self) -> ButtonKind {
        ButtonKind::Button
    }

    pub fn activate(&self) -> FormResult<usize> {
        self.dispatch.clear_all()
    }
}

/// Plain submit button. Activation only raises a submit event at the form
/// boundary; the form decides what happens next.
#[derive(Clone, Debug, Default)]
pub struct SubmitTrigger {
    name: Option<String>,
}

impl SubmitTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn kind(&self) -> ButtonKind {
        ButtonKind::Submit
    }

    pub fn activate(&self, form: &FormController) -> FormResult<SubmitOutcome> {
        let mut event = match &self.name {
            Some(name) => SubmitEvent::from_submitter(name.clone()),
            None => SubmitEvent::new(),
        };
        form.handle_submit(&mut event)
    }
}
