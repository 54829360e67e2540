use super::data::FormData;
use super::error::FormResult;

/// Typed view over a submitted [`FormData`] record.
///
/// Usually derived: `String` and other `FromStr` fields are required,
/// `Option<_>` fields treat a missing or empty value as `None`, and
/// `#[form(name = "...")]` maps a field to a different submitted name.
pub trait FormRecord: Sized {
    const FIELD_NAMES: &'static [&'static str];

    fn from_form_data(data: &FormData) -> FormResult<Self>;
}
