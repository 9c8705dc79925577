//! Atomic multi-step workflows.
//!
//! A [`Workflow`] is an ordered list of [`Step`]s sharing a typed state `S`.
//! [`Engine::execute`] opens one transaction, runs every step against the same
//! [`TxContext`], and then either commits and returns the state's output, or
//! rolls back and reports the first failing step.
//!
//! Dropping the returned future, or a panicking step, drops the open
//! `DatabaseTransaction`, which sea-orm rolls back on drop; no path leaves the
//! transaction open.
use async_trait::async_trait;
use sea_orm::{DatabaseTransaction, TransactionTrait};

use crate::{Engine, EngineError, ResultEngine, WorkflowError, queries::Queries};

/// Handle to the transaction backing one workflow invocation.
pub struct TxContext<'t> {
    tx: &'t DatabaseTransaction,
}

impl<'t> TxContext<'t> {
    fn new(tx: &'t DatabaseTransaction) -> Self {
        Self { tx }
    }

    /// Single-row operations bound to this transaction.
    pub fn queries(&self) -> Queries<'t, DatabaseTransaction> {
        Queries::new(self.tx)
    }

    pub fn connection(&self) -> &'t DatabaseTransaction {
        self.tx
    }
}

/// One unit of work inside a workflow.
///
/// Steps read what earlier steps produced from `state` and record their own
/// output there.
#[async_trait]
pub trait Step<S: Send>: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, cx: &TxContext<'_>, state: &mut S) -> ResultEngine<()>;
}

/// State threaded through the steps of a workflow.
pub trait WorkflowState: Send {
    type Output: Send;

    /// The composite result, or `None` if a step did not record its output.
    fn into_output(self) -> Option<Self::Output>;
}

pub struct Workflow<S: Send> {
    name: &'static str,
    steps: Vec<Box<dyn Step<S>>>,
}

impl<S: WorkflowState> Workflow<S> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: impl Step<S> + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }
}

/// Fetch the output an earlier step left in the state.
pub(crate) fn produced<'a, T>(value: &'a Option<T>, step: &'static str) -> ResultEngine<&'a T> {
    value.as_ref().ok_or(EngineError::MissingStepOutput(step))
}

impl Engine {
    /// Run `workflow` atomically, starting from `state`.
    ///
    /// Returns the state's output only after the commit succeeded. On the
    /// first failing step nothing else runs and the transaction is rolled
    /// back; a rollback failure is reported together with the step error.
    pub async fn execute<S: WorkflowState>(
        &self,
        workflow: &Workflow<S>,
        mut state: S,
    ) -> Result<S::Output, WorkflowError> {
        let tx = self
            .database
            .begin()
            .await
            .map_err(|source| WorkflowError::Begin {
                workflow: workflow.name,
                source,
            })?;

        let failure = {
            let cx = TxContext::new(&tx);
            let mut failure = None;
            for (index, step) in workflow.steps.iter().enumerate() {
                tracing::debug!(workflow = workflow.name, step = step.name(), index, "running step");
                if let Err(cause) = step.run(&cx, &mut state).await {
                    failure = Some(WorkflowError::StepFailed {
                        workflow: workflow.name,
                        index,
                        step: step.name(),
                        cause,
                    });
                    break;
                }
            }
            failure
        };
        if let Some(err) = failure {
            return Err(rollback(tx, err).await);
        }

        let Some(output) = state.into_output() else {
            let err = WorkflowError::Incomplete {
                workflow: workflow.name,
            };
            return Err(rollback(tx, err).await);
        };

        tx.commit().await.map_err(|source| WorkflowError::Commit {
            workflow: workflow.name,
            source,
        })?;
        tracing::info!(
            workflow = workflow.name,
            steps = workflow.steps.len(),
            "workflow committed"
        );

        Ok(output)
    }
}

async fn rollback(tx: DatabaseTransaction, original: WorkflowError) -> WorkflowError {
    tracing::warn!("rolling back: {original}");
    match tx.rollback().await {
        Ok(()) => original,
        Err(rollback) => {
            tracing::error!("rollback failed after \"{original}\": {rollback}");
            WorkflowError::RollbackFailed {
                original: Box::new(original),
                rollback,
            }
        }
    }
}
