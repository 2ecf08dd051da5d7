//! Canned HTTP responses for unit tests.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::http::{HttpError, HttpResponse, Transport};

/// Serves registered responses and records every requested URL.
/// Unregistered URLs fail like a refused connection.
#[derive(Default, Clone)]
pub(crate) struct StubTransport {
    responses: HashMap<String, HttpResponse>,
    pub(crate) requested: RefCell<Vec<String>>,
}

impl StubTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.to_string(), HttpResponse::new(status, body));
        self
    }
}

impl Transport for StubTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.requested.borrow_mut().push(url.to_string());
        self.responses.get(url).cloned().ok_or_else(|| HttpError::Transport {
            url: url.to_string(),
            reason: "connection refused".to_string(),
        })
    }
}
