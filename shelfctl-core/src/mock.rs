//! In-memory transport for tests: records every request and replays queued
//! responses in order.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, ShelfError};
use crate::rest::{RestRequest, Transport};

#[derive(Default)]
pub struct MockTransport {
    requests: Mutex<Vec<RestRequest>>,
    responses: Mutex<VecDeque<Result<Value>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response body
    pub fn respond(&self, body: Value) -> &Self {
        self.responses
            .lock()
            .expect("mock lock poisoned")
            .push_back(Ok(body));
        self
    }

    /// Queue a failure
    pub fn fail(&self, err: ShelfError) -> &Self {
        self.responses
            .lock()
            .expect("mock lock poisoned")
            .push_back(Err(err));
        self
    }

    /// Requests seen so far, oldest first
    pub fn requests(&self) -> Vec<RestRequest> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    /// Unqueued calls answer with an empty array
    async fn execute(&self, request: RestRequest) -> Result<Value> {
        self.requests
            .lock()
            .expect("mock lock poisoned")
            .push(request);
        self.responses
            .lock()
            .expect("mock lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(Value::Array(Vec::new())))
    }
}
