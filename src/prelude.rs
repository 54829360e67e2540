pub use crate::form::rules;
pub use crate::form::{
    FieldController, FieldOptions, FormController, FormData, FormDispatch, FormError, FormOptions,
    FormRecord, FormResult, ResetTrigger, RevalidateMode, SubmitEvent, SubmitOutcome, SubmitPhase,
    SubmitTrigger, Validation, ValueBinding,
};
pub use crate::id::{FieldId, FormId};
