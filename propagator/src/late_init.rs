use crate::error::{self, Boundary, Result};
use crate::{default_excluded_fields, Propagate};
use log::{debug, trace};
use reqsync_model::clients::ApplyClient;
use reqsync_model::{is_empty_value, FieldPath, Requirement};
use snafu::ResultExt;

/// The local `spec` fields the [`LateInitializer`] may fill in.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum LateInitFields {
    /// Every top-level field of the remote `spec`, minus the excluded fields.
    All,
    /// Only these paths, minus any whose top-level field is excluded.
    Only(Vec<FieldPath>),
}

impl Default for LateInitFields {
    fn default() -> Self {
        Self::All
    }
}

/// Fills local `spec` fields that are missing or empty with the non-empty values the remote side
/// assigned, then writes the local requirement with a plain update.
///
/// Late initialization only flows from remote to local and only touches empty fields, so a field
/// that has been set locally, by the requester or by an earlier pass, is never overwritten and
/// repeated passes converge. When nothing changes no write is made.
pub struct LateInitializer<L>
where
    L: ApplyClient,
{
    local: L,
    fields: LateInitFields,
    excluded_fields: Vec<String>,
}

impl<L> LateInitializer<L>
where
    L: ApplyClient,
{
    pub fn new(local: L) -> Self {
        Self {
            local,
            fields: LateInitFields::default(),
            excluded_fields: default_excluded_fields(),
        }
    }

    pub fn with_fields(mut self, fields: LateInitFields) -> Self {
        self.fields = fields;
        self
    }

    /// Replace the set of top-level `spec` fields that are never late-initialized.
    pub fn with_excluded_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    fn is_excluded(&self, path: &FieldPath) -> bool {
        match path.root() {
            None => true,
            Some(root) => self.excluded_fields.iter().any(|excluded| excluded == root),
        }
    }
}

#[async_trait::async_trait]
impl<L> Propagate for LateInitializer<L>
where
    L: ApplyClient,
{
    async fn propagate(&self, local: &mut Requirement, remote: &mut Requirement) -> Result<()> {
        let mut spec = local.spec().context(error::MalformedSnafu {
            boundary: Boundary::Local,
            name: local.name(),
        })?;
        let remote_spec = remote.spec().context(error::MalformedSnafu {
            boundary: Boundary::Remote,
            name: remote.name(),
        })?;

        let candidates = match &self.fields {
            LateInitFields::All => remote_spec
                .keys()
                .map(|field| FieldPath::new([field.as_str()]))
                .collect(),
            LateInitFields::Only(paths) => paths.clone(),
        };

        let mut initialized = Vec::new();
        for path in candidates.into_iter().filter(|p| !self.is_excluded(p)) {
            let value = match path.get(&remote_spec) {
                Some(value) if !is_empty_value(value) => value,
                _ => continue,
            };
            if path.get(&spec).map_or(true, is_empty_value) {
                path.set(&mut spec, value.clone());
                initialized.push(path.to_string());
            }
        }

        if initialized.is_empty() {
            trace!("nothing to late-initialize for '{}'", local.key());
            return Ok(());
        }

        debug!(
            "late-initializing '{}' fields from remote: {}",
            local.key(),
            initialized.join(", ")
        );
        local.set_spec(spec);
        self.local
            .update(local)
            .await
            .context(error::UpdateRequirementSnafu {
                boundary: Boundary::Local,
            })
    }
}
