/*!

The `reqsync-propagator` library keeps a local requirement and its remote counterpart consistent.
Each slice of state has its own propagator:

- [`SpecPropagator`] overlays the local `spec` onto the remote requirement and applies it.
- [`LateInitializer`] fills empty local `spec` fields with defaults the remote side assigned.
- [`StatusPropagator`] copies the remote `status` and conditions into the local requirement.
- [`ConnectionSecretPropagator`] copies the remote connection secret into the local store.

Every propagator implements [`Propagate`], is idempotent, and never retries. [`RequirementSync`]
runs them in order for one sync pass.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

mod connection_secret;
mod error;
mod late_init;
mod spec;
mod status;
mod sync;

pub use connection_secret::ConnectionSecretPropagator;
pub use error::{Boundary, Error, Result};
pub use late_init::{LateInitFields, LateInitializer};
pub use spec::SpecPropagator;
pub use status::StatusPropagator;
pub use sync::{RequirementSync, SyncOutcome};

use reqsync_model::Requirement;

/// Copies one slice of state between a local requirement and its remote counterpart, persisting
/// whichever side it owns. Implementations hold no state between calls, so one instance can serve
/// concurrent passes for different requirements. Passes for the same requirement must be
/// serialized by the caller.
#[async_trait::async_trait]
pub trait Propagate: Send + Sync {
    async fn propagate(&self, local: &mut Requirement, remote: &mut Requirement) -> Result<()>;
}

/// The spec fields excluded from propagation by default, as owned strings.
pub(crate) fn default_excluded_fields() -> Vec<String> {
    reqsync_model::constants::SPEC_EXCLUDED_FIELDS
        .iter()
        .map(|field| field.to_string())
        .collect()
}
