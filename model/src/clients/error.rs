use crate::clients::{HttpStatusCode, StatusCode};
use snafu::Snafu;

/// The `Result` type returned by `clients`.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type returned by `clients`. The variants are public so that alternative
/// [`ApplyClient`](crate::clients::ApplyClient) implementations, e.g. test mocks, can report
/// failures the same way the Kubernetes client does.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Error initializing the Kubernetes client: {}", source))]
    Initialization { source: kube::Error },

    #[snafu(display("Unable to read kubeconfig: {}", source))]
    Kubeconfig {
        source: kube::config::KubeconfigError,
    },

    #[snafu(display("Unable to {} {} '{}': {}", method, what, name, source))]
    KubeApiCall {
        /// What we were trying to do, e.g. 'apply'.
        method: String,
        /// The kind of object, e.g. 'secret'.
        what: String,
        /// The `namespace/name` of the object.
        name: String,
        /// The error from kube-rs.
        source: kube::Error,
    },

    #[snafu(display("Error serializing {} '{}': {}", what, name, source))]
    Serde {
        what: String,
        name: String,
        source: serde_json::Error,
    },
}

impl HttpStatusCode for Error {
    fn status_code(&self) -> Option<StatusCode> {
        match self {
            Error::Initialization { source } | Error::KubeApiCall { source, .. } => {
                source.status_code()
            }
            Error::Kubeconfig { .. } | Error::Serde { .. } => None,
        }
    }
}
