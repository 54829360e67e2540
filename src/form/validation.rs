use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Outcome of running a field rule. Failing is ordinary data, never an error.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Validation {
    pub passed: bool,
    pub messages: Vec<String>,
}

impl Validation {
    pub fn pass() -> Self {
        Self {
            passed: true,
            messages: Vec::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            messages: vec![message.into()],
        }
    }

    pub fn fail_with(messages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            passed: false,
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    /// Combines two outcomes: passes only if both pass, keeps every message.
    pub fn and(mut self, other: Validation) -> Self {
        self.passed &= other.passed;
        self.messages.extend(other.messages);
        self
    }
}

pub trait Validator: Send + Sync {
    fn validate(&self, value: &str) -> Validation;
}

impl<F> Validator for F
where
    F: Fn(&str) -> Validation + Send + Sync,
{
    fn validate(&self, value: &str) -> Validation {
        (self)(value)
    }
}

pub type SharedValidator = Arc<dyn Validator>;

/// Normalizer run on the raw value before the rule sees it.
pub type BeforeValidate = Arc<dyn Fn(&str) -> String + Send + Sync>;

pub type BoxedValidationFuture<'a> = Pin<Box<dyn Future<Output = Validation> + Send + 'a>>;

/// A rule that needs to await something. It must resolve to a final outcome
/// before the field reports anything.
pub trait AsyncValidator: Send + Sync {
    type Fut<'a>: Future<Output = Validation> + Send + 'a
    where
        Self: 'a;

    fn validate<'a>(&'a self, value: &'a str) -> Self::Fut<'a>;
}

impl<F> AsyncValidator for F
where
    F: for<'a> Fn(&'a str) -> BoxedValidationFuture<'a> + Send + Sync,
{
    type Fut<'a>
        = BoxedValidationFuture<'a>
    where
        Self: 'a;

    fn validate<'a>(&'a self, value: &'a str) -> Self::Fut<'a> {
        (self)(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_keeps_messages_from_both_sides() {
        let combined = Validation::fail("too short").and(Validation::fail("needs a digit"));
        assert!(!combined.passed);
        assert_eq!(combined.messages, vec!["too short", "needs a digit"]);

        let passing = Validation::pass().and(Validation::pass());
        assert!(passing.passed);
        assert!(passing.messages.is_empty());
    }

    #[test]
    fn closures_are_validators() {
        let rule = |value: &str| {
            if value.len() > 2 {
                Validation::pass()
            } else {
                Validation::fail("short")
            }
        };
        assert!(Validator::validate(&rule, "abc").passed);
        assert!(!Validator::validate(&rule, "a").passed);
    }
}
