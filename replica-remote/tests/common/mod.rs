//! Scripted HTTP transport shared by the adapter integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use replica_remote::{ApiRequest, ApiResponse, Method, Transport, TransportError};

/// Replays queued replies in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: RefCell<VecDeque<Result<(u16, String), String>>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, status: u16, body: impl Into<String>) -> &Self {
        self.replies.borrow_mut().push_back(Ok((status, body.into())));
        self
    }

    pub fn reply_json(&self, status: u16, body: serde_json::Value) -> &Self {
        self.reply(status, body.to_string())
    }

    pub fn fail(&self, detail: &str) -> &Self {
        self.replies.borrow_mut().push_back(Err(detail.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn request(&self, index: usize) -> ApiRequest {
        self.requests.borrow()[index].clone()
    }

    pub fn calls(&self) -> Vec<(Method, String)> {
        self.requests
            .borrow()
            .iter()
            .map(|r| (r.method, r.url.clone()))
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.replies.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        let next = self
            .replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted request: {} {}", request.method, request.url));
        match next {
            Ok((status, body)) => Ok(ApiResponse {
                url: request.url.clone(),
                status,
                body,
            }),
            Err(detail) => Err(TransportError {
                method: request.method.as_str(),
                url: request.url.clone(),
                detail,
            }),
        }
    }
}
