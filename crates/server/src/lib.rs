use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, WorkflowError};
use token::TokenError;

use api_types::ErrorBody;
pub use server::{ServerState, router, run_with_listener, spawn_with_listener};

mod categories;
mod expenses;
mod groups;
mod invitations;
mod members;
mod server;
mod users;
mod views;

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Workflow(WorkflowError),
    Token(TokenError),
    Unauthorized(String),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        EngineError::MissingStepOutput(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::MissingStepOutput(step) => {
            tracing::error!("workflow step {step} left no output");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

/// A workflow failure is answered like its failing step. Failures of the
/// transaction itself are server errors.
fn workflow_response(err: WorkflowError) -> (StatusCode, String) {
    match err {
        WorkflowError::Rejected { cause, .. } | WorkflowError::StepFailed { cause, .. } => {
            (status_for_engine_error(&cause), message_for_engine_error(cause))
        }
        other => {
            tracing::error!("workflow error: {other}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    }
}

fn token_response(err: TokenError) -> (StatusCode, String) {
    match err {
        TokenError::Invalid | TokenError::Expired => (StatusCode::UNAUTHORIZED, err.to_string()),
        other => {
            tracing::error!("token error: {other}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Workflow(err) => workflow_response(err),
            ServerError::Token(err) => token_response(err),
            ServerError::Unauthorized(err) => (StatusCode::UNAUTHORIZED, err),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<WorkflowError> for ServerError {
    fn from(value: WorkflowError) -> Self {
        Self::Workflow(value)
    }
}

impl From<TokenError> for ServerError {
    fn from(value: TokenError) -> Self {
        Self::Token(value)
    }
}
