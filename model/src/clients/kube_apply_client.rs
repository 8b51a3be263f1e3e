use super::error::{self, Result};
use super::ApplyClient;
use crate::constants::DEFAULT_FIELD_MANAGER;
use crate::requirement::{ObjectKey, Requirement};
use k8s_openapi::api::core::v1::Secret;
use kube::api::{
    ApiResource, DynamicObject, GroupVersionKind, Patch, PatchParams, PostParams, TypeMeta,
};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use log::trace;
use snafu::ResultExt;
use std::path::Path;

/// An [`ApplyClient`] for one Kubernetes API server. Requirements are addressed through a
/// `DynamicObject` API for the requirement's group, version and kind, so any requirement kind can
/// be served without compiled-in types.
///
/// # Example
///
/// ```
///# use reqsync_model::clients::{ApplyClient, KubeApplyClient};
///# use reqsync_model::ObjectKey;
///# use kube::api::GroupVersionKind;
///# async fn no_run() {
/// let gvk = GroupVersionKind::gvk("database.example.org", "v1alpha1", "PostgreSQLInstance");
/// let client = KubeApplyClient::try_default(&gvk).await.unwrap();
/// let requirement = client.get(&ObjectKey::new("my-db", "default")).await.unwrap();
///# }
/// ```
#[derive(Clone)]
pub struct KubeApplyClient {
    client: Client,
    api_resource: ApiResource,
    field_manager: String,
}

impl KubeApplyClient {
    /// Create a new [`KubeApplyClient`] using either `KUBECONFIG` or the in-cluster environment
    /// variables.
    pub async fn try_default(gvk: &GroupVersionKind) -> Result<Self> {
        let client = Client::try_default()
            .await
            .context(error::InitializationSnafu)?;
        Ok(Self::new_from_k8s_client(client, gvk))
    }

    /// Create a [`KubeApplyClient`] from the path to a kubeconfig file. This is how a client for a
    /// store in another cluster is usually built.
    pub async fn new_from_kubeconfig_path(path: &Path, gvk: &GroupVersionKind) -> Result<Self> {
        let kubeconfig = Kubeconfig::read_from(path).context(error::KubeconfigSnafu)?;
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .context(error::KubeconfigSnafu)?;
        let client = Client::try_from(config).context(error::InitializationSnafu)?;
        Ok(Self::new_from_k8s_client(client, gvk))
    }

    /// Create a new [`KubeApplyClient`] from an existing k8s client.
    pub fn new_from_k8s_client(client: Client, gvk: &GroupVersionKind) -> Self {
        Self {
            client,
            api_resource: ApiResource::from_gvk(gvk),
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
        }
    }

    /// Use `field_manager` as the owner of the fields this client applies.
    pub fn with_field_manager<S>(mut self, field_manager: S) -> Self
    where
        S: Into<String>,
    {
        self.field_manager = field_manager.into();
        self
    }

    /// The API resource requirements are addressed through.
    pub fn api_resource(&self) -> &ApiResource {
        &self.api_resource
    }

    /// An `Api` for requirements in `namespace`, or in all namespaces when `namespace` is `None`.
    pub fn api(&self, namespace: Option<&str>) -> Api<DynamicObject> {
        match namespace {
            Some(namespace) => self.requirement_api(namespace),
            None => Api::all_with(self.client.clone(), &self.api_resource),
        }
    }

    fn requirement_api(&self, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &self.api_resource)
    }

    fn secret_api(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn apply_params(&self) -> PatchParams {
        PatchParams::apply(&self.field_manager).force()
    }

    /// Prepare `requirement` for a write. The API server needs the type information in the body,
    /// and an apply request must not carry managed fields.
    fn to_object(&self, requirement: &Requirement) -> DynamicObject {
        let mut object = DynamicObject::from(requirement.clone());
        if object.types.is_none() {
            object.types = Some(TypeMeta {
                api_version: self.api_resource.api_version.clone(),
                kind: self.api_resource.kind.clone(),
            });
        }
        object.metadata.managed_fields = None;
        object
    }
}

#[async_trait::async_trait]
impl ApplyClient for KubeApplyClient {
    async fn get(&self, key: &ObjectKey) -> Result<Requirement> {
        trace!("getting {} '{}'", self.api_resource.kind, key);
        let object = self
            .requirement_api(&key.namespace)
            .get(&key.name)
            .await
            .context(error::KubeApiCallSnafu {
                method: "get",
                what: &self.api_resource.kind,
                name: key.to_string(),
            })?;
        Ok(object.into())
    }

    async fn apply(&self, requirement: &mut Requirement) -> Result<()> {
        let key = requirement.key();
        trace!("applying {} '{}'", self.api_resource.kind, key);
        let mut object = self.to_object(requirement);
        // The merge is driven by field ownership, not by the version that was read.
        object.metadata.resource_version = None;
        let applied = self
            .requirement_api(&key.namespace)
            .patch(&key.name, &self.apply_params(), &Patch::Apply(&object))
            .await
            .context(error::KubeApiCallSnafu {
                method: "apply",
                what: &self.api_resource.kind,
                name: key.to_string(),
            })?;
        *requirement = applied.into();
        Ok(())
    }

    async fn update(&self, requirement: &mut Requirement) -> Result<()> {
        let key = requirement.key();
        trace!("updating {} '{}'", self.api_resource.kind, key);
        let object = self.to_object(requirement);
        let updated = self
            .requirement_api(&key.namespace)
            .replace(&key.name, &PostParams::default(), &object)
            .await
            .context(error::KubeApiCallSnafu {
                method: "update",
                what: &self.api_resource.kind,
                name: key.to_string(),
            })?;
        *requirement = updated.into();
        Ok(())
    }

    async fn update_status(&self, requirement: &mut Requirement) -> Result<()> {
        let key = requirement.key();
        trace!("updating status of {} '{}'", self.api_resource.kind, key);
        let data = serde_json::to_vec(&self.to_object(requirement)).context(error::SerdeSnafu {
            what: &self.api_resource.kind,
            name: key.to_string(),
        })?;
        let updated = self
            .requirement_api(&key.namespace)
            .replace_status(&key.name, &PostParams::default(), data)
            .await
            .context(error::KubeApiCallSnafu {
                method: "update status of",
                what: &self.api_resource.kind,
                name: key.to_string(),
            })?;
        *requirement = updated.into();
        Ok(())
    }

    async fn get_secret(&self, key: &ObjectKey) -> Result<Secret> {
        trace!("getting secret '{}'", key);
        self.secret_api(&key.namespace)
            .get(&key.name)
            .await
            .context(error::KubeApiCallSnafu {
                method: "get",
                what: "secret",
                name: key.to_string(),
            })
    }

    async fn apply_secret(&self, secret: &mut Secret) -> Result<()> {
        let key = ObjectKey::new(
            secret.metadata.name.clone().unwrap_or_default(),
            secret.metadata.namespace.clone().unwrap_or_default(),
        );
        trace!("applying secret '{}'", key);
        secret.metadata.managed_fields = None;
        secret.metadata.resource_version = None;
        let applied = self
            .secret_api(&key.namespace)
            .patch(&key.name, &self.apply_params(), &Patch::Apply(&*secret))
            .await
            .context(error::KubeApiCallSnafu {
                method: "apply",
                what: "secret",
                name: key.to_string(),
            })?;
        *secret = applied;
        Ok(())
    }
}
