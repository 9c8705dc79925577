//! The module contains the errors the engine can throw.
//!
//! - [`EngineError`] is what a single operation (or a workflow step) fails
//!   with.
//! - [`WorkflowError`] is what [`Engine::execute`] returns: it says which step
//!   failed and never drops a rollback failure.
//!
//!  [`Engine::execute`]: crate::Engine::execute
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Missing output of step \"{0}\"")]
    MissingStepOutput(&'static str),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Classify an insert/update failure: constraint violations become domain
    /// errors labelled with `what`, everything else stays a database error.
    pub(crate) fn from_write(err: DbErr, what: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::ExistingKey(what.to_string()),
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                Self::KeyNotFound(format!("{what} reference"))
            }
            _ => match err {
                DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => {
                    Self::KeyNotFound(what.to_string())
                }
                other => Self::Database(other),
            },
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::MissingStepOutput(a), Self::MissingStepOutput(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// Failure of a whole workflow invocation.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Input refused before any transaction was opened.
    #[error("workflow {workflow}: {cause}")]
    Rejected {
        workflow: &'static str,
        #[source]
        cause: EngineError,
    },
    #[error("workflow {workflow}: cannot begin transaction: {source}")]
    Begin {
        workflow: &'static str,
        #[source]
        source: DbErr,
    },
    #[error("workflow {workflow}: step {index} ({step}) failed: {cause}")]
    StepFailed {
        workflow: &'static str,
        index: usize,
        step: &'static str,
        #[source]
        cause: EngineError,
    },
    #[error("workflow {workflow}: steps finished without producing a result")]
    Incomplete { workflow: &'static str },
    #[error("workflow {workflow}: commit failed: {source}")]
    Commit {
        workflow: &'static str,
        #[source]
        source: DbErr,
    },
    #[error("{original}; rollback failed: {rollback}")]
    RollbackFailed {
        original: Box<WorkflowError>,
        #[source]
        rollback: DbErr,
    },
}

impl WorkflowError {
    /// The step error behind this failure, if a step failed.
    pub fn cause(&self) -> Option<&EngineError> {
        match self {
            Self::Rejected { cause, .. } | Self::StepFailed { cause, .. } => Some(cause),
            Self::RollbackFailed { original, .. } => original.cause(),
            _ => None,
        }
    }

    /// Index of the failed step, if a step failed.
    pub fn failed_step(&self) -> Option<usize> {
        match self {
            Self::StepFailed { index, .. } => Some(*index),
            Self::RollbackFailed { original, .. } => original.failed_step(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_failed() -> WorkflowError {
        WorkflowError::StepFailed {
            workflow: "create_group",
            index: 1,
            step: "add_owner_membership",
            cause: EngineError::KeyNotFound("group".to_string()),
        }
    }

    #[test]
    fn step_failure_exposes_its_cause() {
        let err = step_failed();
        assert_eq!(
            err.cause(),
            Some(&EngineError::KeyNotFound("group".to_string()))
        );
        assert_eq!(err.failed_step(), Some(1));
    }

    #[test]
    fn rollback_failure_keeps_both_errors() {
        let err = WorkflowError::RollbackFailed {
            original: Box::new(step_failed()),
            rollback: DbErr::Custom("connection reset".to_string()),
        };

        let message = err.to_string();
        assert!(message.contains("add_owner_membership"), "{message}");
        assert!(message.contains("connection reset"), "{message}");
        assert_eq!(err.failed_step(), Some(1));
        assert!(err.cause().is_some());
    }

    #[test]
    fn not_updated_maps_to_not_found() {
        assert_eq!(
            EngineError::from_write(DbErr::RecordNotUpdated, "invitation"),
            EngineError::KeyNotFound("invitation".to_string())
        );
    }
}
