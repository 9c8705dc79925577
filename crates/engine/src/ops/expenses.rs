use async_trait::async_trait;
use sea_orm::ConnectionTrait;

use crate::{
    EngineError, ResultEngine, WorkflowError, expenses,
    queries::{CreateExpenseParams, Page, Queries, UpdateExpenseParams},
    workflow::{Step, TxContext, Workflow, WorkflowState},
};

use super::{Engine, access::require_group_member};

const RECORD_EXPENSE: &str = "record_expense";

/// An expense recorded by `user_id` on behalf of `paid_by_id`. Both must be
/// members of the group.
#[derive(Clone, Debug)]
pub struct RecordExpenseParams {
    pub group_id: i64,
    pub user_id: i64,
    pub paid_by_id: i64,
    pub amount_cents: i64,
    pub description: String,
}

fn validate_amount(amount_cents: i64) -> ResultEngine<()> {
    if amount_cents <= 0 {
        return Err(EngineError::InvalidInput(
            "amount must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Load an expense through the group it belongs to.
async fn group_expense<C: ConnectionTrait>(
    queries: &Queries<'_, C>,
    group_id: i64,
    expense_id: i64,
) -> ResultEngine<expenses::Model> {
    let expense = queries.get_expense(expense_id).await?;
    if expense.group_id != group_id {
        return Err(EngineError::KeyNotFound("expense".to_string()));
    }
    Ok(expense)
}

#[derive(Default)]
struct RecordExpenseState {
    expense: Option<expenses::Model>,
}

impl WorkflowState for RecordExpenseState {
    type Output = expenses::Model;

    fn into_output(self) -> Option<expenses::Model> {
        self.expense
    }
}

struct RequireMembers {
    group_id: i64,
    user_id: i64,
    paid_by_id: i64,
}

#[async_trait]
impl Step<RecordExpenseState> for RequireMembers {
    fn name(&self) -> &'static str {
        "require_group_members"
    }

    async fn run(&self, cx: &TxContext<'_>, _state: &mut RecordExpenseState) -> ResultEngine<()> {
        let queries = cx.queries();
        require_group_member(&queries, self.group_id, self.user_id).await?;
        match queries.get_group_member(self.group_id, self.paid_by_id).await {
            Ok(_) => Ok(()),
            Err(EngineError::KeyNotFound(_)) => Err(EngineError::InvalidInput(
                "payer is not a member of this group".to_string(),
            )),
            Err(err) => Err(err),
        }
    }
}

struct InsertExpense(CreateExpenseParams);

#[async_trait]
impl Step<RecordExpenseState> for InsertExpense {
    fn name(&self) -> &'static str {
        "create_expense"
    }

    async fn run(&self, cx: &TxContext<'_>, state: &mut RecordExpenseState) -> ResultEngine<()> {
        state.expense = Some(cx.queries().create_expense(self.0.clone()).await?);
        Ok(())
    }
}

impl Engine {
    /// Record an expense paid by a group member.
    ///
    /// The membership checks and the insert share one transaction, so a
    /// payer removed concurrently cannot end up owning a new expense.
    pub async fn record_expense(
        &self,
        params: RecordExpenseParams,
    ) -> Result<expenses::Model, WorkflowError> {
        validate_amount(params.amount_cents).map_err(|cause| WorkflowError::Rejected {
            workflow: RECORD_EXPENSE,
            cause,
        })?;

        let workflow = Workflow::new(RECORD_EXPENSE)
            .step(RequireMembers {
                group_id: params.group_id,
                user_id: params.user_id,
                paid_by_id: params.paid_by_id,
            })
            .step(InsertExpense(CreateExpenseParams {
                group_id: params.group_id,
                paid_by_id: params.paid_by_id,
                amount_cents: params.amount_cents,
                description: params.description.trim().to_string(),
            }));
        self.execute(&workflow, RecordExpenseState::default()).await
    }

    pub async fn expense(
        &self,
        group_id: i64,
        expense_id: i64,
        user_id: i64,
    ) -> ResultEngine<expenses::Model> {
        let queries = self.queries();
        require_group_member(&queries, group_id, user_id).await?;
        group_expense(&queries, group_id, expense_id).await
    }

    pub async fn list_expenses(
        &self,
        group_id: i64,
        user_id: i64,
        page: Page,
    ) -> ResultEngine<Vec<expenses::Model>> {
        let queries = self.queries();
        require_group_member(&queries, group_id, user_id).await?;
        queries.list_expenses(group_id, page).await
    }

    /// Change the amount and description of an expense. Any member may.
    pub async fn update_expense(
        &self,
        group_id: i64,
        user_id: i64,
        params: UpdateExpenseParams,
    ) -> ResultEngine<expenses::Model> {
        validate_amount(params.amount_cents)?;
        let queries = self.queries();
        require_group_member(&queries, group_id, user_id).await?;
        group_expense(&queries, group_id, params.id).await?;
        queries
            .update_expense(UpdateExpenseParams {
                description: params.description.trim().to_string(),
                ..params
            })
            .await
    }

    pub async fn delete_expense(
        &self,
        group_id: i64,
        expense_id: i64,
        user_id: i64,
    ) -> ResultEngine<()> {
        let queries = self.queries();
        require_group_member(&queries, group_id, user_id).await?;
        group_expense(&queries, group_id, expense_id).await?;
        queries.delete_expense(expense_id).await?;
        tracing::info!(group_id, expense_id, "expense deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_must_be_positive() {
        assert!(validate_amount(1).is_ok());
        assert_eq!(
            validate_amount(0).unwrap_err(),
            EngineError::InvalidInput("amount must be positive".to_string())
        );
        assert!(validate_amount(-250).is_err());
    }
}
