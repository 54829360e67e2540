//! Stock rules for common field types.
//!
//! Every rule except [`required`] passes on an empty value, so an optional
//! field left blank never blocks the form.

use std::sync::Arc;

use super::binding::ValueBinding;
use super::validation::{SharedValidator, Validation, Validator};

pub fn required(message: impl Into<String>) -> impl Validator + 'static {
    let message = message.into();
    move |value: &str| {
        if value.trim().is_empty() {
            Validation::fail(message.clone())
        } else {
            Validation::pass()
        }
    }
}

pub fn min_length(min: usize, message: impl Into<String>) -> impl Validator + 'static {
    let message = message.into();
    move |value: &str| {
        if value.is_empty() || value.chars().count() >= min {
            Validation::pass()
        } else {
            Validation::fail(message.clone())
        }
    }
}

pub fn max_length(max: usize, message: impl Into<String>) -> impl Validator + 'static {
    let message = message.into();
    move |value: &str| {
        if value.chars().count() <= max {
            Validation::pass()
        } else {
            Validation::fail(message.clone())
        }
    }
}

pub fn email(message: impl Into<String>) -> impl Validator + 'static {
    let message = message.into();
    move |value: &str| {
        if value.is_empty() || looks_like_email(value) {
            Validation::pass()
        } else {
            Validation::fail(message.clone())
        }
    }
}

pub fn phone(message: impl Into<String>) -> impl Validator + 'static {
    let message = message.into();
    move |value: &str| {
        if value.is_empty() || looks_like_phone(value) {
            Validation::pass()
        } else {
            Validation::fail(message.clone())
        }
    }
}

/// Confirmation rule: the value must equal the binding's current value.
pub fn equals_binding(source: ValueBinding, message: impl Into<String>) -> impl Validator + 'static {
    let message = message.into();
    move |value: &str| match source.get() {
        Ok(expected) if expected == value => Validation::pass(),
        _ => Validation::fail(message.clone()),
    }
}

/// Runs every rule and merges the outcomes.
pub fn all_of(rules: Vec<SharedValidator>) -> impl Validator + 'static {
    move |value: &str| {
        rules
            .iter()
            .fold(Validation::pass(), |outcome, rule| outcome.and(rule.validate(value)))
    }
}

pub fn shared(rule: impl Validator + 'static) -> SharedValidator {
    Arc::new(rule)
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels = domain.split('.').collect::<Vec<_>>();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

fn looks_like_phone(value: &str) -> bool {
    let allowed = |ch: char| ch.is_ascii_digit() || matches!(ch, ' ' | '-' | '(' | ')' | '.');
    let body = value.strip_prefix('+').unwrap_or(value);
    let digits = body.chars().filter(char::is_ascii_digit).count();
    body.chars().all(allowed) && (7..=15).contains(&digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank_input() {
        let rule = required("required");
        assert!(!rule.validate("").passed);
        assert!(!rule.validate("   ").passed);
        assert_eq!(rule.validate("").messages, vec!["required"]);
        assert!(rule.validate("x").passed);
    }

    #[test]
    fn optional_rules_pass_on_empty_values() {
        assert!(email("bad email").validate("").passed);
        assert!(phone("bad phone").validate("").passed);
        assert!(min_length(3, "short").validate("").passed);
    }

    #[test]
    fn email_shape() {
        let rule = email("bad email");
        assert!(rule.validate("user@example.com").passed);
        assert!(rule.validate("first.last@mail.example.org").passed);
        assert!(!rule.validate("user@").passed);
        assert!(!rule.validate("@example.com").passed);
        assert!(!rule.validate("user@example").passed);
        assert!(!rule.validate("user@@example.com").passed);
        assert!(!rule.validate("us er@example.com").passed);
        assert!(!rule.validate("user@example..com").passed);
    }

    #[test]
    fn phone_shape() {
        let rule = phone("bad phone");
        assert!(rule.validate("+1 (555) 010-9999").passed);
        assert!(rule.validate("5550109").passed);
        assert!(!rule.validate("555-01").passed);
        assert!(!rule.validate("555-0109x").passed);
        assert!(!rule.validate("++15550109").passed);
    }

    #[test]
    fn length_limits_count_chars() {
        assert!(min_length(3, "short").validate("äöü").passed);
        assert!(!min_length(3, "short").validate("äö").passed);
        assert!(max_length(2, "long").validate("äö").passed);
        assert!(!max_length(2, "long").validate("äöü").passed);
    }

    #[test]
    fn equals_binding_tracks_current_source_value() {
        let password = ValueBinding::new("secret");
        let rule = equals_binding(password.clone(), "mismatch");
        assert!(rule.validate("secret").passed);

        password.set("changed").expect("set");
        assert!(!rule.validate("secret").passed);
        assert!(rule.validate("changed").passed);
    }

    #[test]
    fn all_of_collects_every_failure() {
        let rule = all_of(vec![
            shared(required("required")),
            shared(min_length(8, "too short")),
            shared(email("bad email")),
        ]);
        let outcome = rule.validate("a@b");
        assert!(!outcome.passed);
        assert_eq!(outcome.messages, vec!["too short", "bad email"]);
        assert!(rule.validate("someone@example.com").passed);
    }
}
