use thiserror::Error;

/// Convenience result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Convenience result type for repository operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Convenience result type for credential and token operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Convenience result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned when an uploaded buffer cannot be turned into rows.
///
/// Always recoverable: callers report it as a rejected upload.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The buffer is not a workbook container calamine can open.
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// The buffer was decoded as CSV and is malformed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The workbook opened but contains no sheets.
    #[error("workbook has no sheets")]
    NoSheets,

    /// The upload contained zero bytes.
    #[error("upload is empty")]
    EmptyInput,
}

/// Error type for the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No entity with the given id exists.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// A uniqueness constraint was violated.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// The backing store could not serve the request.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

/// Error type for the hashing and token capabilities.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Password hashing failed, or a stored hash could not be parsed.
    #[error("password hash error: {message}")]
    Hash { message: String },

    /// Token encoding, decoding or validation failed.
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Error type returned by [`crate::service::AnalyticsService`] operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request is missing required input or carries an invalid value.
    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("username already exists")]
    UsernameTaken,

    #[error("invalid credentials")]
    InvalidCredentials,

    /// No token, or a token that failed verification.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The caller is authenticated but the access policy denied the operation.
    #[error("forbidden")]
    Forbidden(#[from] crate::policy::Forbidden),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("rejected upload: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ServiceError {
    /// Fixed HTTP status a route layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::BadRequest { .. }
            | ServiceError::UsernameTaken
            | ServiceError::InvalidCredentials
            | ServiceError::Decode(_) => 400,
            ServiceError::Unauthorized { .. } => 401,
            ServiceError::Forbidden(_) => 403,
            ServiceError::NotFound { .. } => 404,
            ServiceError::Store(_) | ServiceError::Auth(_) => 500,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => ServiceError::NotFound { kind, id },
            other => ServiceError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodeError, ServiceError, StoreError};
    use crate::policy::Forbidden;

    #[test]
    fn status_codes_are_fixed_per_variant() {
        assert_eq!(ServiceError::from(DecodeError::NoSheets).status_code(), 400);
        assert_eq!(ServiceError::from(Forbidden).status_code(), 403);
        assert_eq!(
            ServiceError::Unauthorized {
                message: "no token".to_string()
            }
            .status_code(),
            401
        );
        assert_eq!(
            ServiceError::from(StoreError::Unavailable {
                message: "down".to_string()
            })
            .status_code(),
            500
        );
    }

    #[test]
    fn store_not_found_maps_to_service_not_found() {
        let err = ServiceError::from(StoreError::NotFound {
            kind: "account",
            id: "42".to_string(),
        });
        assert!(matches!(err, ServiceError::NotFound { kind: "account", .. }));
        assert_eq!(err.to_string(), "account '42' not found");
    }
}
