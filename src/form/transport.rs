use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use super::data::FormData;
use super::error::FormResult;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMethod {
    Get,
    #[default]
    Post,
}

/// What a plain, handler-less form submission would put on the wire.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NativeSubmission {
    pub action: String,
    pub method: FormMethod,
    pub body: String,
}

impl NativeSubmission {
    /// GET carries the encoded record in the query string, POST in the body.
    pub fn encode(action: &str, method: FormMethod, data: &FormData) -> Self {
        let encoded = data.to_urlencoded();
        match method {
            FormMethod::Get => {
                let separator = if action.contains('?') { '&' } else { '?' };
                let action = if encoded.is_empty() {
                    action.to_string()
                } else {
                    format!("{action}{separator}{encoded}")
                };
                Self {
                    action,
                    method,
                    body: String::new(),
                }
            }
            FormMethod::Post => Self {
                action: action.to_string(),
                method,
                body: encoded,
            },
        }
    }
}

/// Fallback path used when the form has no submit handler.
pub trait Transport: Send + Sync + 'static {
    fn deliver(&self, submission: NativeSubmission) -> FormResult<()>;
}

/// Transport that keeps every delivered submission in memory.
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    delivered: Arc<RwLock<Vec<NativeSubmission>>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> Vec<NativeSubmission> {
        match self.delivered.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Transport for InMemoryTransport {
    fn deliver(&self, submission: NativeSubmission) -> FormResult<()> {
        let mut delivered = match self.delivered.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        delivered.push(submission);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_appends_query_to_action() {
        let data = FormData::from_iter([("q", "rust forms")]);
        let submission = NativeSubmission::encode("/search", FormMethod::Get, &data);
        assert_eq!(submission.action, "/search?q=rust+forms");
        assert!(submission.body.is_empty());

        let submission = NativeSubmission::encode("/search?page=2", FormMethod::Get, &data);
        assert_eq!(submission.action, "/search?page=2&q=rust+forms");
    }

    #[test]
    fn post_carries_body() {
        let data = FormData::from_iter([("a", "1"), ("b", "2")]);
        let submission = NativeSubmission::encode("/save", FormMethod::Post, &data);
        assert_eq!(submission.action, "/save");
        assert_eq!(submission.body, "a=1&b=2");
    }

    #[test]
    fn in_memory_transport_records_deliveries() {
        let transport = InMemoryTransport::new();
        let shared = transport.clone();
        shared
            .deliver(NativeSubmission::encode(
                "/x",
                FormMethod::Post,
                &FormData::new(),
            ))
            .expect("deliver");
        assert_eq!(transport.deliveries().len(), 1);
    }
}
