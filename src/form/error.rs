use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum FormError {
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),

    #[error("submit handler failed: {0}")]
    Handler(String),

    #[error("transport failed: {0}")]
    Transport(String),

    #[error("submitted record is missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` holds an invalid value: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

pub type FormResult<T> = Result<T, FormError>;

pub(crate) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(crate) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}

/// Runs every step and reports the first failure, so one broken callback does
/// not starve the rest.
pub(crate) fn run_all<I>(steps: I) -> FormResult<()>
where
    I: IntoIterator<Item = FormResult<()>>,
{
    let mut first_error = None;
    for step in steps {
        if let Err(error) = step {
            first_error.get_or_insert(error);
        }
    }
    first_error.map_or(Ok(()), Err)
}
