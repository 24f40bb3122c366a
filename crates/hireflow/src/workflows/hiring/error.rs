use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

/// Stable error kinds exposed across the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ValidationError,
    UnauthorizedError,
    NotFoundError,
    InvalidStateError,
    InvalidTransitionError,
    DuplicateError,
    WindowExpiredError,
    DependencyError,
}

impl ErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::UnauthorizedError => "UnauthorizedError",
            ErrorKind::NotFoundError => "NotFoundError",
            ErrorKind::InvalidStateError => "InvalidStateError",
            ErrorKind::InvalidTransitionError => "InvalidTransitionError",
            ErrorKind::DuplicateError => "DuplicateError",
            ErrorKind::WindowExpiredError => "WindowExpiredError",
            ErrorKind::DependencyError => "DependencyError",
        }
    }

    pub const fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::UnauthorizedError => StatusCode::FORBIDDEN,
            ErrorKind::NotFoundError => StatusCode::NOT_FOUND,
            ErrorKind::InvalidStateError
            | ErrorKind::InvalidTransitionError
            | ErrorKind::DuplicateError
            | ErrorKind::WindowExpiredError => StatusCode::CONFLICT,
            ErrorKind::DependencyError => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Domain failure raised by the hiring lifecycle services.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HiringError {
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("not permitted: {0}")]
    Unauthorized(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("{entity} cannot move from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
    },
    #[error("{0}")]
    Duplicate(String),
    #[error(
        "withdrawal window of {window_minutes} minutes has expired \
         ({elapsed_minutes} minutes since applying)"
    )]
    WindowExpired {
        window_minutes: i64,
        elapsed_minutes: i64,
    },
    #[error("{dependency} failed: {message}")]
    Dependency {
        dependency: &'static str,
        message: String,
    },
}

impl HiringError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn dependency(dependency: &'static str, source: impl std::fmt::Display) -> Self {
        Self::Dependency {
            dependency,
            message: source.to_string(),
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            HiringError::Validation { .. } => ErrorKind::ValidationError,
            HiringError::Unauthorized(_) => ErrorKind::UnauthorizedError,
            HiringError::NotFound(_) => ErrorKind::NotFoundError,
            HiringError::InvalidState(_) => ErrorKind::InvalidStateError,
            HiringError::InvalidTransition { .. } => ErrorKind::InvalidTransitionError,
            HiringError::Duplicate(_) => ErrorKind::DuplicateError,
            HiringError::WindowExpired { .. } => ErrorKind::WindowExpiredError,
            HiringError::Dependency { .. } => ErrorKind::DependencyError,
        }
    }
}

/// Storage failure reported by repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl From<RepositoryError> for HiringError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict => {
                HiringError::Duplicate("record already exists".to_string())
            }
            RepositoryError::NotFound => HiringError::NotFound("record".to_string()),
            RepositoryError::Unavailable(message) => HiringError::Dependency {
                dependency: "storage",
                message,
            },
        }
    }
}

impl IntoResponse for HiringError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let mut body = json!({
            "error": kind.label(),
            "message": self.to_string(),
        });
        if let HiringError::Validation { field, .. } = &self {
            body["field"] = json!(field);
        }
        (kind.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_failures_map_to_stable_kinds() {
        assert_eq!(
            HiringError::from(RepositoryError::Conflict).kind(),
            ErrorKind::DuplicateError
        );
        assert_eq!(
            HiringError::from(RepositoryError::NotFound).kind(),
            ErrorKind::NotFoundError
        );
        assert_eq!(
            HiringError::from(RepositoryError::Unavailable("offline".to_string())).kind(),
            ErrorKind::DependencyError
        );
    }

    #[test]
    fn validation_responses_carry_the_field() {
        let response =
            HiringError::validation("end_time", "must be after start_time").into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn window_expiry_is_a_conflict() {
        let error = HiringError::WindowExpired {
            window_minutes: 60,
            elapsed_minutes: 61,
        };
        assert_eq!(error.kind().status_code(), StatusCode::CONFLICT);
        assert!(error.to_string().contains("61 minutes"));
    }
}
