use kube::api::{ApiResource, DynamicObject};
use kube::Api;
use kube_runtime::controller::Action;
use reqsync_model::clients::KubeApplyClient;
use reqsync_model::ObjectKey;
use reqsync_propagator::{LateInitFields, RequirementSync};
use std::sync::Arc;
use std::time::Duration;

/// This is used by `kube-runtime` to pass any custom information we need when [`reconcile`] is
/// called.
///
/// [`reconcile`]: crate::reconcile::reconcile
pub(crate) type Context = Arc<ContextData>;

pub(crate) struct ContextData {
    local: KubeApplyClient,
    remote: KubeApplyClient,
    sync: RequirementSync<KubeApplyClient, KubeApplyClient>,
    local_namespace: Option<String>,
    remote_namespace: String,
    requeue_interval: Duration,
}

pub(crate) struct ContextBuilder {
    local: KubeApplyClient,
    remote: KubeApplyClient,
    late_init_fields: LateInitFields,
    local_namespace: Option<String>,
    remote_namespace: String,
    requeue_interval: Duration,
}

impl ContextBuilder {
    pub(crate) fn new(
        local: KubeApplyClient,
        remote: KubeApplyClient,
        remote_namespace: String,
    ) -> Self {
        Self {
            local,
            remote,
            late_init_fields: LateInitFields::All,
            local_namespace: None,
            remote_namespace,
            requeue_interval: Duration::from_secs(30),
        }
    }

    pub(crate) fn late_init_fields(mut self, fields: LateInitFields) -> Self {
        self.late_init_fields = fields;
        self
    }

    pub(crate) fn local_namespace(mut self, namespace: Option<String>) -> Self {
        self.local_namespace = namespace;
        self
    }

    pub(crate) fn requeue_interval(mut self, interval: Duration) -> Self {
        self.requeue_interval = interval;
        self
    }

    pub(crate) fn build(self) -> Context {
        let sync = RequirementSync::new(self.local.clone(), self.remote.clone())
            .with_late_init_fields(self.late_init_fields);
        Arc::new(ContextData {
            local: self.local,
            remote: self.remote,
            sync,
            local_namespace: self.local_namespace,
            remote_namespace: self.remote_namespace,
            requeue_interval: self.requeue_interval,
        })
    }
}

impl ContextData {
    /// The `Api` the controller watches local requirements through.
    pub(crate) fn local_api(&self) -> Api<DynamicObject> {
        self.local.api(self.local_namespace.as_deref())
    }

    pub(crate) fn api_resource(&self) -> &ApiResource {
        self.local.api_resource()
    }

    pub(crate) fn local_client(&self) -> &KubeApplyClient {
        &self.local
    }

    pub(crate) fn remote_client(&self) -> &KubeApplyClient {
        &self.remote
    }

    pub(crate) fn sync(&self) -> &RequirementSync<KubeApplyClient, KubeApplyClient> {
        &self.sync
    }

    /// Where the remote counterpart of the local requirement named `name` lives.
    pub(crate) fn remote_key(&self, name: &str) -> ObjectKey {
        ObjectKey::new(name, &self.remote_namespace)
    }

    /// Tell the controller to reconcile the requirement again after the configured interval.
    pub(crate) fn requeue(&self) -> Action {
        Action::requeue(self.requeue_interval)
    }
}
