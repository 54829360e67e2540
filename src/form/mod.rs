mod binding;
mod clear;
mod controller;
mod data;
mod dispatch;
mod error;
mod field;
mod record;
mod results;
mod signal;
mod transport;
mod trigger;
mod validation;

pub mod rules;


pub use binding::ValueBinding;
pub use clear::{ClearAction, ClearRegistry, SilentRegistry, ValueReader, ValueSource, ValueSourceRegistry};
pub use controller::{FormController, FormOptions, SubmitHandler, SubmitOutcome, SubmitPhase};
pub use data::FormData;
pub use dispatch::FormDispatch;
pub use error::{FormError, FormResult};
pub use field::{FieldController, FieldOptions, FieldSnapshot, RevalidateMode, ValueMode};
pub use fieldrelay_derive::FormRecord;
pub use record::FormRecord;
pub use results::{ResultMap, ResultRegistry, aggregate_validity};
pub use signal::{Listener, Signal, SubscriptionId};
pub use transport::{FormMethod, InMemoryTransport, NativeSubmission, Transport};
pub use trigger::{ButtonKind, ResetTrigger, SubmitEvent, SubmitTrigger};
pub use validation::{
    AsyncValidator, BeforeValidate, BoxedValidationFuture, SharedValidator, Validation, Validator,
};
