//! In-memory [`ResourceClient`] for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ClientError, ResourceClient};
use crate::resource::RemoteResource;

#[derive(Default)]
pub(crate) struct FakeClient {
    reads: Mutex<VecDeque<Option<RemoteResource>>>,
    create_result: Mutex<Option<RemoteResource>>,
    update_result: Mutex<Option<RemoteResource>>,
    delete_missing: Mutex<bool>,
    failing_action: Mutex<Option<String>>,
    calls: Mutex<Vec<Call>>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Create(serde_json::Value),
    Read(String),
    Update(String, serde_json::Value),
    Delete(String),
    Invoke(Option<String>, String, serde_json::Value),
}

impl FakeClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a read answer. The last queued answer repeats once the queue
    /// drains.
    pub(crate) fn push_read(&self, answer: Option<RemoteResource>) {
        self.reads.lock().unwrap().push_back(answer);
    }

    pub(crate) fn on_create(&self, resource: RemoteResource) {
        *self.create_result.lock().unwrap() = Some(resource);
    }

    pub(crate) fn on_update(&self, resource: RemoteResource) {
        *self.update_result.lock().unwrap() = Some(resource);
    }

    pub(crate) fn delete_reports_missing(&self) {
        *self.delete_missing.lock().unwrap() = true;
    }

    /// Make every `invoke` of `action` fail with a 400.
    pub(crate) fn fail_action(&self, action: &str) {
        *self.failing_action.lock().unwrap() = Some(action.to_string());
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn reads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Read(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// `(target id, action)` of every side action, in call order.
    pub(crate) fn actions(&self) -> Vec<(Option<String>, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Invoke(id, action, _) => Some((id, action)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn bodies(&self) -> Vec<serde_json::Value> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(body) | Call::Update(_, body) => Some(body),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ResourceClient for FakeClient {
    async fn create(&self, body: &serde_json::Value) -> Result<RemoteResource, ClientError> {
        self.calls.lock().unwrap().push(Call::Create(body.clone()));
        self.create_result
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ClientError::Api {
                status: 500,
                message: "no create result configured".to_string(),
            })
    }

    async fn read(&self, id: &str) -> Result<Option<RemoteResource>, ClientError> {
        self.calls.lock().unwrap().push(Call::Read(id.to_string()));
        let mut reads = self.reads.lock().unwrap();
        let answer = if reads.len() > 1 {
            reads.pop_front().flatten()
        } else {
            reads.front().cloned().flatten()
        };
        Ok(answer)
    }

    async fn update(
        &self,
        id: &str,
        body: &serde_json::Value,
    ) -> Result<RemoteResource, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Update(id.to_string(), body.clone()));
        self.update_result
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ClientError::Api {
                status: 500,
                message: "no update result configured".to_string(),
            })
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(Call::Delete(id.to_string()));
        if *self.delete_missing.lock().unwrap() {
            return Err(ClientError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn invoke(
        &self,
        id: Option<&str>,
        action: &str,
        body: &serde_json::Value,
    ) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(Call::Invoke(
            id.map(str::to_string),
            action.to_string(),
            body.clone(),
        ));
        if self.failing_action.lock().unwrap().as_deref() == Some(action) {
            return Err(ClientError::Api {
                status: 400,
                message: format!("{action} rejected"),
            });
        }
        Ok(())
    }
}
