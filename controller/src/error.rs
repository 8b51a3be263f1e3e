use reqsync_model::clients::{Error as ClientError, HttpStatusCode, StatusCode};
use reqsync_propagator::Boundary;
use snafu::Snafu;

pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum Error {
    #[snafu(display("Unable to create the {} client: {}", boundary, source))]
    CreateClient {
        boundary: Boundary,
        source: ClientError,
    },

    #[snafu(display("Invalid duration '{}': {}", input, reason))]
    Duration { input: String, reason: String },

    #[snafu(display("remote: unable to load requirement '{}': {}", key, source))]
    LoadRemote { key: String, source: ClientError },

    #[snafu(display("Unable to sync requirement '{}': {}", key, source))]
    Sync {
        key: String,
        source: reqsync_propagator::Error,
    },
}

impl Error {
    /// The side of the boundary the error came from, if it came from one of the stores.
    pub(crate) fn boundary(&self) -> Option<Boundary> {
        match self {
            Error::CreateClient { boundary, .. } => Some(*boundary),
            Error::Duration { .. } => None,
            Error::LoadRemote { .. } => Some(Boundary::Remote),
            Error::Sync { source, .. } => Some(source.boundary()),
        }
    }
}

impl HttpStatusCode for Error {
    fn status_code(&self) -> Option<StatusCode> {
        match self {
            Error::CreateClient { source, .. } | Error::LoadRemote { source, .. } => {
                source.status_code()
            }
            Error::Duration { .. } => None,
            Error::Sync { source, .. } => source.status_code(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use kube::error::ErrorResponse;

    fn api_error(code: u16) -> ClientError {
        ClientError::KubeApiCall {
            method: "update".to_string(),
            what: "requirement".to_string(),
            name: "team-a/db".to_string(),
            source: kube::Error::Api(ErrorResponse {
                status: "Failure".to_string(),
                message: "the object has been modified".to_string(),
                reason: "Conflict".to_string(),
                code,
            }),
        }
    }

    #[test]
    fn sync_conflict_is_classified() {
        let e = Error::Sync {
            key: "team-a/db".to_string(),
            source: reqsync_propagator::Error::UpdateRequirement {
                boundary: Boundary::Local,
                source: api_error(409),
            },
        };
        assert!(e.is_conflict());
        assert_eq!(e.boundary(), Some(Boundary::Local));
        assert!(e.to_string().contains("local: cannot update requirement"));

        let e = Error::LoadRemote {
            key: "fulfillment/db".to_string(),
            source: api_error(500),
        };
        assert!(!e.is_conflict());
        assert_eq!(e.boundary(), Some(Boundary::Remote));
    }
}
