use crate::error::{self, Boundary, Result};
use crate::{
    ConnectionSecretPropagator, LateInitFields, LateInitializer, Propagate, SpecPropagator,
    StatusPropagator,
};
use log::{debug, trace};
use reqsync_model::clients::ApplyClient;
use reqsync_model::Requirement;
use snafu::ResultExt;

/// The state a sync pass left the requirement pair in.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SyncOutcome {
    /// The remote requirement is ready and its connection secret, if any was wanted, has been
    /// copied.
    Ready,
    /// The remote requirement is not ready yet. Spec, defaults and status were synced; the
    /// connection secret was not.
    Pending,
}

/// Runs the propagators for one requirement pair in order:
///
/// 1. overlay the local `spec` onto the remote requirement and apply it,
/// 2. re-read the remote requirement,
/// 3. late-initialize the local `spec` from the remote one,
/// 4. copy the remote status and write the local status,
/// 5. copy the connection secret once the remote requirement is ready.
///
/// The pass stops at the first error. Nothing is retried here; the caller decides when to run the
/// next pass.
pub struct RequirementSync<L, R>
where
    L: ApplyClient + Clone,
    R: ApplyClient + Clone,
{
    local: L,
    remote: R,
    spec: SpecPropagator<R>,
    late_init: LateInitializer<L>,
    status: StatusPropagator,
    connection_secret: ConnectionSecretPropagator<L, R>,
}

impl<L, R> RequirementSync<L, R>
where
    L: ApplyClient + Clone,
    R: ApplyClient + Clone,
{
    pub fn new(local: L, remote: R) -> Self {
        Self {
            spec: SpecPropagator::new(remote.clone()),
            late_init: LateInitializer::new(local.clone()),
            status: StatusPropagator::new(),
            connection_secret: ConnectionSecretPropagator::new(local.clone(), remote.clone()),
            local,
            remote,
        }
    }

    /// Only late-initialize `fields`.
    pub fn with_late_init_fields(mut self, fields: LateInitFields) -> Self {
        self.late_init = LateInitializer::new(self.local.clone()).with_fields(fields);
        self
    }

    /// Run one sync pass. `local` and `remote` are updated to what was last written or read.
    pub async fn sync(
        &self,
        local: &mut Requirement,
        remote: &mut Requirement,
    ) -> Result<SyncOutcome> {
        trace!("syncing '{}' with remote '{}'", local.key(), remote.key());
        self.spec.propagate(local, remote).await?;

        *remote = self
            .remote
            .get(&remote.key())
            .await
            .context(error::RefreshRequirementSnafu {
                boundary: Boundary::Remote,
            })?;

        self.late_init.propagate(local, remote).await?;

        self.status.propagate(local, remote).await?;
        self.local
            .update_status(local)
            .await
            .context(error::UpdateStatusSnafu {
                boundary: Boundary::Local,
            })?;

        if !remote.is_ready() {
            debug!("remote '{}' is not ready yet", remote.key());
            return Ok(SyncOutcome::Pending);
        }

        self.connection_secret.propagate(local, remote).await?;
        Ok(SyncOutcome::Ready)
    }
}
