use crate::context::Context;
use crate::error::{self, Error, Result};
use futures::StreamExt;
use kube::api::DynamicObject;
use kube_runtime::controller::Action;
use kube_runtime::{controller, Controller};
use log::{debug, error, info, trace, warn};
use reqsync_model::clients::{AllowNotFound, ApplyClient, HttpStatusCode};
use reqsync_model::{Condition, ObjectKey, Requirement};
use reqsync_propagator::SyncOutcome;
use snafu::ResultExt;
use std::sync::Arc;

pub(crate) async fn run_requirement_controller(context: Context) {
    Controller::new_with(
        context.local_api(),
        kube_runtime::watcher::Config::default(),
        context.api_resource().clone(),
    )
    .run(reconcile, handle_reconciliation_error, context)
    .for_each(|reconciliation_result| async move {
        if let Err(reconciliation_err) = reconciliation_result {
            match &reconciliation_err {
                controller::Error::ObjectNotFound { .. } => {
                    debug!("Object is gone: {}", reconciliation_err)
                }
                _ => error!("Error during reconciliation: {}", reconciliation_err),
            }
        }
    })
    .await;
}

/// Run one sync pass for a local requirement and its remote counterpart.
pub(crate) async fn reconcile(object: Arc<DynamicObject>, ctx: Context) -> Result<Action> {
    let mut local = Requirement::from(object.as_ref().clone());
    let key = local.key().to_string();
    trace!("Reconciling requirement '{}'", key);

    if local.metadata().deletion_timestamp.is_some() {
        debug!("Requirement '{}' is being deleted, not syncing", key);
        return Ok(Action::await_change());
    }

    let remote_key = ctx.remote_key(local.name());
    let mut remote = ctx
        .remote_client()
        .get(&remote_key)
        .await
        .allow_not_found(|_| debug!("Remote requirement '{}' does not exist yet", remote_key))
        .context(error::LoadRemoteSnafu {
            key: remote_key.to_string(),
        })?
        .unwrap_or_else(|| new_remote(&remote_key));

    match ctx.sync().sync(&mut local, &mut remote).await {
        Ok(SyncOutcome::Ready) => debug!("Requirement '{}' is ready", key),
        Ok(SyncOutcome::Pending) => info!("Waiting for remote requirement '{}'", remote_key),
        Err(e) => {
            report_error(&ctx, &mut local, &e.to_string()).await;
            return Err(e).context(error::SyncSnafu { key });
        }
    }
    Ok(ctx.requeue())
}

/// `handle_reconciliation_error` is called when `reconcile` returns an error.
fn handle_reconciliation_error(_: Arc<DynamicObject>, e: &Error, ctx: Context) -> Action {
    if e.is_conflict() {
        // Another writer got there first; the next pass starts from a fresh read.
        debug!("Reconciliation conflict: {}", e);
        return ctx.requeue();
    }
    match e.boundary() {
        Some(boundary) => error!("Reconciliation error ({}): {}", boundary, e),
        None => error!("Reconciliation error: {}", e),
    }
    ctx.requeue()
}

/// A remote requirement that has not been created yet. The spec propagator fills in the type and
/// spec from the local requirement.
fn new_remote(key: &ObjectKey) -> Requirement {
    let mut remote = Requirement::new();
    let metadata = remote.metadata_mut();
    metadata.name = Some(key.name.clone());
    metadata.namespace = Some(key.namespace.clone());
    remote
}

/// Record the failed pass on the local requirement. This is best effort: the error is returned to
/// the controller either way.
async fn report_error(ctx: &Context, local: &mut Requirement, message: &str) {
    if let Err(e) = local.set_condition(Condition::reconcile_error(message)) {
        warn!("Unable to set error condition on '{}': {}", local.key(), e);
        return;
    }
    if let Err(e) = ctx.local_client().update_status(local).await {
        warn!("Unable to report error on '{}': {}", local.key(), e);
    }
}
