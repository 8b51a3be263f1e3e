use reqsync_model::clients::{Error as ClientError, HttpStatusCode, StatusCode};
use reqsync_model::Error as ModelError;
use snafu::Snafu;
use std::fmt::{Display, Formatter};

/// The `Result` type returned by propagators.
pub type Result<T> = std::result::Result<T, Error>;

/// The side of the trust boundary an error came from. A caller uses it to decide which side's
/// write to retry or which side's health to report.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Boundary {
    Local,
    Remote,
}

impl Display for Boundary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Boundary::Local => write!(f, "local"),
            Boundary::Remote => write!(f, "remote"),
        }
    }
}

/// The error type returned by propagators. Every message starts with the boundary tag, e.g.
/// `remote: cannot apply requirement: ...`.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("{}: cannot apply requirement: {}", boundary, source))]
    ApplyRequirement {
        boundary: Boundary,
        source: ClientError,
    },

    #[snafu(display("{}: cannot apply connection secret: {}", boundary, source))]
    ApplySecret {
        boundary: Boundary,
        source: ClientError,
    },

    #[snafu(display("{}: cannot get connection secret: {}", boundary, source))]
    GetSecret {
        boundary: Boundary,
        source: ClientError,
    },

    #[snafu(display("{}: requirement '{}' is malformed: {}", boundary, name, source))]
    Malformed {
        boundary: Boundary,
        name: String,
        source: ModelError,
    },

    #[snafu(display("{}: cannot get requirement: {}", boundary, source))]
    RefreshRequirement {
        boundary: Boundary,
        source: ClientError,
    },

    #[snafu(display("{}: cannot update requirement: {}", boundary, source))]
    UpdateRequirement {
        boundary: Boundary,
        source: ClientError,
    },

    #[snafu(display("{}: cannot update requirement status: {}", boundary, source))]
    UpdateStatus {
        boundary: Boundary,
        source: ClientError,
    },
}

impl Error {
    /// The side of the boundary whose read or write failed.
    pub fn boundary(&self) -> Boundary {
        match self {
            Error::ApplyRequirement { boundary, .. }
            | Error::ApplySecret { boundary, .. }
            | Error::GetSecret { boundary, .. }
            | Error::Malformed { boundary, .. }
            | Error::RefreshRequirement { boundary, .. }
            | Error::UpdateRequirement { boundary, .. }
            | Error::UpdateStatus { boundary, .. } => *boundary,
        }
    }

    /// A document did not have the expected shape. Retrying will not help; the caller should
    /// report a diagnostic condition instead of backing off.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Malformed { .. })
    }
}

impl HttpStatusCode for Error {
    fn status_code(&self) -> Option<StatusCode> {
        match self {
            Error::ApplyRequirement { source, .. }
            | Error::ApplySecret { source, .. }
            | Error::GetSecret { source, .. }
            | Error::RefreshRequirement { source, .. }
            | Error::UpdateRequirement { source, .. }
            | Error::UpdateStatus { source, .. } => source.status_code(),
            Error::Malformed { .. } => None,
        }
    }
}
