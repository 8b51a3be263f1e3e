use crate::error::{self, Boundary, Result};
use crate::Propagate;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use log::{debug, trace};
use maplit::btreemap;
use reqsync_model::clients::ApplyClient;
use reqsync_model::constants::{APP_MANAGED_BY, LABEL_OWNER_NAME, LABEL_OWNER_UID, REQSYNC};
use reqsync_model::Requirement;
use snafu::ResultExt;

/// Copies the connection secret of the remote requirement into the local store, under the name
/// the local requirement asked for and owned by the local requirement.
///
/// The secret data is copied value for value. Only the name, namespace and ownership metadata
/// differ from the remote secret. Nothing happens when the local requirement does not ask for a
/// secret, or when the remote requirement has not declared one yet.
pub struct ConnectionSecretPropagator<L, R>
where
    L: ApplyClient,
    R: ApplyClient,
{
    local: L,
    remote: R,
}

impl<L, R> ConnectionSecretPropagator<L, R>
where
    L: ApplyClient,
    R: ApplyClient,
{
    pub fn new(local: L, remote: R) -> Self {
        Self { local, remote }
    }
}

#[async_trait::async_trait]
impl<L, R> Propagate for ConnectionSecretPropagator<L, R>
where
    L: ApplyClient,
    R: ApplyClient,
{
    async fn propagate(&self, local: &mut Requirement, remote: &mut Requirement) -> Result<()> {
        let name = match local.desired_secret_name() {
            Some(name) => name.to_string(),
            None => {
                trace!("'{}' does not want a connection secret", local.key());
                return Ok(());
            }
        };
        let remote_ref = match remote.secret_reference() {
            Some(remote_ref) => remote_ref,
            None => {
                debug!(
                    "remote '{}' has not declared a connection secret yet",
                    remote.key()
                );
                return Ok(());
            }
        };

        let remote_secret = self
            .remote
            .get_secret(&remote_ref)
            .await
            .context(error::GetSecretSnafu {
                boundary: Boundary::Remote,
            })?;

        let mut secret = connection_secret_for(local, name, remote_secret);
        debug!(
            "applying connection secret '{}' from remote '{}' for '{}'",
            secret.metadata.name.as_deref().unwrap_or(""),
            remote_ref,
            local.key()
        );
        self.local
            .apply_secret(&mut secret)
            .await
            .context(error::ApplySecretSnafu {
                boundary: Boundary::Local,
            })
    }
}

/// Build the local copy of `remote_secret` named `name` in the namespace of `owner`.
fn connection_secret_for(owner: &Requirement, name: String, remote_secret: Secret) -> Secret {
    let identity = owner.identity();
    let owner_references = if identity.uid.is_empty() || owner.types().is_none() {
        None
    } else {
        Some(vec![owner.controller_reference()])
    };
    Secret {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: Some(identity.namespace),
            labels: Some(btreemap! {
                LABEL_OWNER_NAME.to_string() => identity.name,
                LABEL_OWNER_UID.to_string() => identity.uid,
                APP_MANAGED_BY.to_string() => REQSYNC.to_string(),
            }),
            owner_references,
            ..ObjectMeta::default()
        },
        data: remote_secret.data,
        type_: remote_secret.type_,
        ..Secret::default()
    }
}
