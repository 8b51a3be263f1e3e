use crate::error::{self, Boundary, Result};
use crate::{default_excluded_fields, Propagate};
use log::{debug, trace};
use reqsync_model::clients::ApplyClient;
use reqsync_model::{Document, Requirement};
use snafu::ResultExt;

/// Overlays the local `spec` onto the remote requirement and applies it through the remote
/// client.
///
/// The overlay is additive: every local field outside the exclusion set is set on the remote
/// `spec`, and remote fields the local requirement does not mention are left alone so that the
/// fulfilling side can own fields the requester never set. The remote requirement is changed in
/// place. The apply request itself only carries the type, name, namespace and overlaid fields, so
/// the field manager never takes ownership of fields another writer set.
pub struct SpecPropagator<R>
where
    R: ApplyClient,
{
    remote: R,
    excluded_fields: Vec<String>,
}

impl<R> SpecPropagator<R>
where
    R: ApplyClient,
{
    /// Create a `SpecPropagator` that excludes
    /// [`SPEC_EXCLUDED_FIELDS`](reqsync_model::constants::SPEC_EXCLUDED_FIELDS).
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            excluded_fields: default_excluded_fields(),
        }
    }

    /// Replace the set of top-level `spec` fields that are never propagated.
    pub fn with_excluded_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    fn is_excluded(&self, field: &str) -> bool {
        self.excluded_fields.iter().any(|excluded| excluded == field)
    }
}

#[async_trait::async_trait]
impl<R> Propagate for SpecPropagator<R>
where
    R: ApplyClient,
{
    async fn propagate(&self, local: &mut Requirement, remote: &mut Requirement) -> Result<()> {
        let overlay = local.spec().context(error::MalformedSnafu {
            boundary: Boundary::Local,
            name: local.name(),
        })?;
        let mut spec = remote.spec().context(error::MalformedSnafu {
            boundary: Boundary::Remote,
            name: remote.name(),
        })?;

        let mut applied = Document::new();
        for (field, value) in overlay {
            if self.is_excluded(&field) {
                trace!("not propagating local-only field '{}'", field);
                continue;
            }
            spec.insert(field.clone(), value.clone());
            applied.insert(field, value);
        }

        adopt_identity(local, remote);
        remote.set_spec(spec);

        debug!("applying spec of '{}' to remote '{}'", local.key(), remote.key());
        let mut patch = apply_patch(remote, applied);
        self.remote
            .apply(&mut patch)
            .await
            .context(error::ApplyRequirementSnafu {
                boundary: Boundary::Remote,
            })?;
        *remote.metadata_mut() = patch.metadata().clone();
        Ok(())
    }
}

/// The partial object sent with the apply request: the identity of `remote` and the overlaid
/// `spec` fields, nothing else.
fn apply_patch(remote: &Requirement, spec: Document) -> Requirement {
    let mut patch = Requirement::new();
    patch.set_types(remote.types().cloned());
    let metadata = patch.metadata_mut();
    metadata.name = remote.metadata().name.clone();
    metadata.namespace = remote.metadata().namespace.clone();
    patch.set_spec(spec);
    patch
}

/// A remote requirement that does not exist yet takes its name, namespace and type from the local
/// one. Whatever the remote requirement already has is kept.
fn adopt_identity(local: &Requirement, remote: &mut Requirement) {
    if remote.types().is_none() {
        remote.set_types(local.types().cloned());
    }
    let metadata = remote.metadata_mut();
    if metadata.name.as_deref().unwrap_or("").is_empty() {
        metadata.name = local.metadata().name.clone();
    }
    if metadata.namespace.as_deref().unwrap_or("").is_empty() {
        metadata.namespace = local.metadata().namespace.clone();
    }
}
