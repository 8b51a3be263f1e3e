use crate::clients::Error as ClientError;
pub use http::StatusCode;
use kube::Error;

pub trait HttpStatusCode {
    fn status_code(&self) -> Option<StatusCode>;

    fn is_status_code(&self, status_code: StatusCode) -> bool {
        self.status_code()
            .map(|some| some == status_code)
            .unwrap_or_default()
    }

    /// The store rejected a write because the object changed since it was read.
    fn is_conflict(&self) -> bool {
        self.is_status_code(StatusCode::CONFLICT)
    }

    fn is_not_found(&self) -> bool {
        self.is_status_code(StatusCode::NOT_FOUND)
    }
}

impl HttpStatusCode for kube::Error {
    fn status_code(&self) -> Option<StatusCode> {
        if let Error::Api(error_response) = self {
            StatusCode::from_u16(error_response.code).ok()
        } else {
            None
        }
    }
}

impl<T, E> HttpStatusCode for std::result::Result<T, E>
where
    E: HttpStatusCode,
{
    fn status_code(&self) -> Option<StatusCode> {
        self.as_ref().err().and_then(|e| e.status_code())
    }
}

/// Turns a `NOT_FOUND` error into `Ok(None)`.
pub trait AllowNotFound<T> {
    /// Returns `Ok(None)` if the error is a `NOT_FOUND`, after handing the error to `on_missing`.
    /// Any other error is returned unchanged.
    fn allow_not_found<F>(self, on_missing: F) -> std::result::Result<Option<T>, ClientError>
    where
        F: FnOnce(&ClientError);
}

impl<T> AllowNotFound<T> for std::result::Result<T, ClientError> {
    fn allow_not_found<F>(self, on_missing: F) -> std::result::Result<Option<T>, ClientError>
    where
        F: FnOnce(&ClientError),
    {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => {
                on_missing(&e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
