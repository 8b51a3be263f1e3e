use super::error::Result;
use crate::requirement::{ObjectKey, Requirement};
use k8s_openapi::api::core::v1::Secret;
use std::sync::Arc;

/// `ApplyClient` reads and writes requirements and their connection secrets in one backing store.
/// A sync pass holds two of them, one scoped to the local store and one scoped to the remote
/// store, and every write names the client it goes through.
///
/// This is provided as a trait so that mock implementations can be injected into the propagators
/// for testing purposes. In practice you will use the [`KubeApplyClient`].
///
/// Write operations take the object by mutable reference and replace it with the stored object the
/// server returns, so the caller's view reflects what was written.
///
/// [`KubeApplyClient`]: crate::clients::KubeApplyClient
#[async_trait::async_trait]
pub trait ApplyClient: Send + Sync {
    /// Get the requirement at `key`.
    async fn get(&self, key: &ObjectKey) -> Result<Requirement>;

    /// Create or update `requirement`, merging its fields onto the stored object with field-owner
    /// semantics. `requirement` should be a partial object carrying only the fields the caller
    /// owns, since every field sent is claimed by the client's field manager. Fields owned by
    /// other writers are left alone.
    async fn apply(&self, requirement: &mut Requirement) -> Result<()>;

    /// Replace the stored requirement with `requirement`. The write is rejected with a conflict if
    /// the stored object changed since `requirement` was read.
    async fn update(&self, requirement: &mut Requirement) -> Result<()>;

    /// Replace the stored `status` of `requirement`, with the same concurrency rules as `update`.
    async fn update_status(&self, requirement: &mut Requirement) -> Result<()>;

    /// Get the secret at `key`.
    async fn get_secret(&self, key: &ObjectKey) -> Result<Secret>;

    /// Create or update `secret` with field-owner merge semantics.
    async fn apply_secret(&self, secret: &mut Secret) -> Result<()>;
}

#[async_trait::async_trait]
impl<T> ApplyClient for Arc<T>
where
    T: ApplyClient + ?Sized,
{
    async fn get(&self, key: &ObjectKey) -> Result<Requirement> {
        self.as_ref().get(key).await
    }

    async fn apply(&self, requirement: &mut Requirement) -> Result<()> {
        self.as_ref().apply(requirement).await
    }

    async fn update(&self, requirement: &mut Requirement) -> Result<()> {
        self.as_ref().update(requirement).await
    }

    async fn update_status(&self, requirement: &mut Requirement) -> Result<()> {
        self.as_ref().update_status(requirement).await
    }

    async fn get_secret(&self, key: &ObjectKey) -> Result<Secret> {
        self.as_ref().get_secret(key).await
    }

    async fn apply_secret(&self, secret: &mut Secret) -> Result<()> {
        self.as_ref().apply_secret(secret).await
    }
}
