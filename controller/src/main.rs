/*!

This [controller] keeps requirements in a local cluster in sync with their counterparts in a remote
cluster. The local spec is applied remotely, defaults and status assigned remotely flow back, and
the connection secret is copied into the local cluster once the remote requirement is ready.

[controller]: https://kubernetes.io/docs/concepts/architecture/controller/

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

use crate::config::Args;
use crate::context::ContextBuilder;
use crate::error::Result;
use crate::reconcile::run_requirement_controller;
use clap::Parser;
use env_logger::Builder;
use log::{error, info, LevelFilter};
use reqsync_model::clients::KubeApplyClient;
use reqsync_propagator::Boundary;
use snafu::ResultExt;

mod config;
mod context;
mod error;
mod reconcile;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(args.log_level);
    info!("Starting");
    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let gvk = args.gvk();

    // Initialize the local client from the given kubeconfig, in-cluster variables or KUBECONFIG.
    let local = match &args.local_kubeconfig {
        Some(path) => KubeApplyClient::new_from_kubeconfig_path(path, &gvk).await,
        None => KubeApplyClient::try_default(&gvk).await,
    }
    .context(error::CreateClientSnafu {
        boundary: Boundary::Local,
    })?
    .with_field_manager(&args.field_manager);

    let remote = KubeApplyClient::new_from_kubeconfig_path(&args.remote_kubeconfig, &gvk)
        .await
        .context(error::CreateClientSnafu {
            boundary: Boundary::Remote,
        })?
        .with_field_manager(&args.field_manager);

    info!(
        "Syncing {} requirements into remote namespace '{}'",
        args.kind, args.remote_namespace
    );
    let context = ContextBuilder::new(local, remote, args.remote_namespace.clone())
        .late_init_fields(args.late_init_fields())
        .local_namespace(args.local_namespace.clone())
        .requeue_interval(args.requeue_interval)
        .build();

    run_requirement_controller(context).await;
    Ok(())
}

/// Initialize the logger with the value passed by `--log-level` (or its default) when the
/// `RUST_LOG` environment variable is not present. If present, the `RUST_LOG` environment variable
/// overrides `--log-level`.
fn init_logger(level: LevelFilter) {
    match std::env::var(env_logger::DEFAULT_FILTER_ENV).ok() {
        Some(_) => {
            // RUST_LOG exists; env_logger will use it.
            Builder::from_default_env().init();
        }
        None => {
            // RUST_LOG does not exist; use the given level for the reqsync crates only.
            Builder::new()
                .filter(Some(env!("CARGO_CRATE_NAME")), level)
                .filter(Some("reqsync_model"), level)
                .filter(Some("reqsync_propagator"), level)
                .init();
        }
    }
}
