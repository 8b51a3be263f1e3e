/*!

Clients that read and write requirements and their connection secrets. The [`ApplyClient`] trait
is the seam between the propagators and a backing store; [`KubeApplyClient`] implements it for a
Kubernetes API server.

!*/

mod apply_client;
mod error;
mod http_status_code;
mod kube_apply_client;

pub use apply_client::ApplyClient;
pub use error::{Error, Result};
pub use http_status_code::{AllowNotFound, HttpStatusCode, StatusCode};
pub use kube_apply_client::KubeApplyClient;
