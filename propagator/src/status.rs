use crate::error::{self, Boundary, Result};
use crate::Propagate;
use log::trace;
use reqsync_model::Requirement;
use snafu::ResultExt;

/// Replaces the local `status` with a verbatim copy of the remote one. The status is owned
/// entirely by the remote side, so this is a full replacement: a condition that exists only
/// locally is dropped, and fields the local side does not know about are carried over unchanged.
///
/// Nothing is written. The caller persists the local requirement, usually together with its other
/// local changes.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusPropagator;

impl StatusPropagator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Propagate for StatusPropagator {
    async fn propagate(&self, local: &mut Requirement, remote: &mut Requirement) -> Result<()> {
        let status = remote.checked_status().context(error::MalformedSnafu {
            boundary: Boundary::Remote,
            name: remote.name(),
        })?;

        trace!(
            "copying status from remote '{}' to '{}'",
            remote.key(),
            local.key()
        );
        local.set_status(status);
        Ok(())
    }
}
