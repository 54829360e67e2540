extern crate self as fieldrelay;

pub mod form;
pub mod id;
pub mod prelude;

pub use id::{FieldId, FormId};
