/*!

This test module provides a mock implementation of the [`ApplyClient`] that keeps objects in memory
and records every call, so that the propagators can be tested in the absence of Kubernetes.

!*/

use k8s_openapi::api::core::v1::Secret;
use kube::error::ErrorResponse;
use reqsync_model::clients::{ApplyClient, Error as ClientError, Result as ClientResult};
use reqsync_model::{ObjectKey, Requirement};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// The `ApplyClient` operations, used to record calls and to inject failures.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Method {
    Get,
    Apply,
    Update,
    UpdateStatus,
    GetSecret,
    ApplySecret,
}

#[derive(Default)]
struct State {
    requirements: HashMap<ObjectKey, Requirement>,
    secrets: HashMap<ObjectKey, Secret>,
    calls: Vec<Method>,
    applied: Vec<Requirement>,
    failing: HashSet<Method>,
}

/// An in-memory store. Clones share the same store, so a test can keep one clone to inspect what
/// the propagators did with another.
#[derive(Clone, Default)]
pub struct MockApplyClient {
    state: Arc<Mutex<State>>,
}

impl MockApplyClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of `method` fail with an internal server error.
    pub fn failing(self, method: Method) -> Self {
        self.state.lock().unwrap().failing.insert(method);
        self
    }

    pub fn with_requirement(self, requirement: Requirement) -> Self {
        self.state
            .lock()
            .unwrap()
            .requirements
            .insert(requirement.key(), requirement);
        self
    }

    pub fn with_secret(self, secret: Secret) -> Self {
        self.state
            .lock()
            .unwrap()
            .secrets
            .insert(secret_key(&secret), secret);
        self
    }

    pub fn calls(&self) -> Vec<Method> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, method: Method) -> usize {
        self.calls().into_iter().filter(|m| *m == method).count()
    }

    /// The request bodies of every successful `apply`, in order.
    pub fn applied(&self) -> Vec<Requirement> {
        self.state.lock().unwrap().applied.clone()
    }

    pub fn requirement(&self, key: &ObjectKey) -> Option<Requirement> {
        self.state.lock().unwrap().requirements.get(key).cloned()
    }

    pub fn secret(&self, key: &ObjectKey) -> Option<Secret> {
        self.state.lock().unwrap().secrets.get(key).cloned()
    }

    /// Record a call of `method` on the object at `key` and fail it if requested.
    fn record(&self, method: Method, key: &ObjectKey) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(method);
        if state.failing.contains(&method) {
            return Err(api_error(method, key, 500, "InternalError", "boom"));
        }
        Ok(())
    }
}

fn secret_key(secret: &Secret) -> ObjectKey {
    ObjectKey::new(
        secret.metadata.name.clone().unwrap_or_default(),
        secret.metadata.namespace.clone().unwrap_or_default(),
    )
}

pub fn api_error(method: Method, key: &ObjectKey, code: u16, reason: &str, message: &str) -> ClientError {
    ClientError::KubeApiCall {
        method: format!("{:?}", method),
        what: "object".to_string(),
        name: key.to_string(),
        source: kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: message.to_string(),
            reason: reason.to_string(),
            code,
        }),
    }
}

#[async_trait::async_trait]
impl ApplyClient for MockApplyClient {
    async fn get(&self, key: &ObjectKey) -> ClientResult<Requirement> {
        self.record(Method::Get, key)?;
        self.requirement(key)
            .ok_or_else(|| api_error(Method::Get, key, 404, "NotFound", "not found"))
    }

    /// Merges the top-level `spec` fields of `requirement` onto the stored object, like a
    /// server-side apply, and returns the merged object.
    async fn apply(&self, requirement: &mut Requirement) -> ClientResult<()> {
        let key = requirement.key();
        self.record(Method::Apply, &key)?;
        let mut state = self.state.lock().unwrap();
        state.applied.push(requirement.clone());
        let merged = match state.requirements.get(&key) {
            Some(stored) => {
                let mut merged = stored.clone();
                let mut spec = merged.spec().unwrap();
                spec.extend(requirement.spec().unwrap());
                merged.set_spec(spec);
                merged
            }
            None => requirement.clone(),
        };
        state.requirements.insert(key, merged.clone());
        *requirement = merged;
        Ok(())
    }

    async fn update(&self, requirement: &mut Requirement) -> ClientResult<()> {
        let key = requirement.key();
        self.record(Method::Update, &key)?;
        self.state
            .lock()
            .unwrap()
            .requirements
            .insert(key, requirement.clone());
        Ok(())
    }

    async fn update_status(&self, requirement: &mut Requirement) -> ClientResult<()> {
        let key = requirement.key();
        self.record(Method::UpdateStatus, &key)?;
        let mut state = self.state.lock().unwrap();
        let stored = state
            .requirements
            .entry(key)
            .or_insert_with(|| requirement.clone());
        stored.set_status(requirement.status().unwrap());
        Ok(())
    }

    async fn get_secret(&self, key: &ObjectKey) -> ClientResult<Secret> {
        self.record(Method::GetSecret, key)?;
        self.secret(key)
            .ok_or_else(|| api_error(Method::GetSecret, key, 404, "NotFound", "not found"))
    }

    async fn apply_secret(&self, secret: &mut Secret) -> ClientResult<()> {
        let key = secret_key(secret);
        self.record(Method::ApplySecret, &key)?;
        self.state
            .lock()
            .unwrap()
            .secrets
            .insert(key, secret.clone());
        Ok(())
    }
}
