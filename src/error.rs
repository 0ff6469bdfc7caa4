use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Hint appended to workout lookups that miss.
pub const REFRESH_HINT: &str = "Try refreshing the week.";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

#[derive(Error, Debug)]
pub enum WorkoutError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    BusinessRule(String),
    #[error("{0}")]
    ExhaustedPool(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Ownership(String),
    #[error("{0}")]
    Generation(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl WorkoutError {
    pub fn validation(message: impl Into<String>) -> Self {
        WorkoutError::Validation(message.into())
    }

    pub fn business_rule(message: impl Into<String>) -> Self {
        WorkoutError::BusinessRule(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        WorkoutError::NotFound(message.into())
    }

    pub fn workout_not_found() -> Self {
        WorkoutError::NotFound(format!("Workout not found. {REFRESH_HINT}"))
    }

    pub fn forbidden() -> Self {
        WorkoutError::Ownership("You don't have access to this workout".to_string())
    }

    pub fn code(&self) -> &'static str {
        match self {
            WorkoutError::Validation(_) => "VALIDATION_ERROR",
            WorkoutError::BusinessRule(_) => "BUSINESS_RULE",
            WorkoutError::ExhaustedPool(_) => "EXHAUSTED_POOL",
            WorkoutError::NotFound(_) => "NOT_FOUND",
            WorkoutError::Ownership(_) => "FORBIDDEN",
            WorkoutError::Generation(_) => "GENERATION_ERROR",
            WorkoutError::Storage(_) => "STORAGE_ERROR",
            WorkoutError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            WorkoutError::Validation(_)
            | WorkoutError::BusinessRule(_)
            | WorkoutError::ExhaustedPool(_)
            | WorkoutError::Generation(_) => StatusCode::BAD_REQUEST,
            WorkoutError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkoutError::Ownership(_) => StatusCode::FORBIDDEN,
            WorkoutError::Storage(_) | WorkoutError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WorkoutError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Storage details stay in the log
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for WorkoutError {
    fn from(rejection: JsonRejection) -> Self {
        WorkoutError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for WorkoutError {
    fn from(rejection: QueryRejection) -> Self {
        WorkoutError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for WorkoutError {
    fn from(rejection: PathRejection) -> Self {
        WorkoutError::Validation(rejection.body_text())
    }
}

pub type WorkoutResult<T> = Result<T, WorkoutError>;
