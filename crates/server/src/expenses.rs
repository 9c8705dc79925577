//! Group expenses. Every operation needs membership of the group.

use api_types::{
    Pagination,
    expense::{ExpenseDeleted, ExpenseNew, ExpenseUpdate, ExpenseView, ExpensesResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{RecordExpenseParams, UpdateExpenseParams};
use token::Payload;

use crate::{ServerError, server::ServerState, views};

pub async fn list(
    Extension(payload): Extension<Payload>,
    State(state): State<ServerState>,
    Path(group_id): Path<i64>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let expenses = state
        .engine
        .list_expenses(group_id, payload.user_id, views::page(pagination))
        .await?
        .into_iter()
        .map(views::expense)
        .collect();
    Ok(Json(ExpensesResponse { expenses }))
}

pub async fn create(
    Extension(payload): Extension<Payload>,
    State(state): State<ServerState>,
    Path(group_id): Path<i64>,
    Json(body): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let expense = state
        .engine
        .record_expense(RecordExpenseParams {
            group_id,
            user_id: payload.user_id,
            paid_by_id: body.paid_by_id.unwrap_or(payload.user_id),
            amount_cents: body.amount_cents,
            description: body.description,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(views::expense(expense))))
}

pub async fn get(
    Extension(payload): Extension<Payload>,
    State(state): State<ServerState>,
    Path((group_id, expense_id)): Path<(i64, i64)>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .engine
        .expense(group_id, expense_id, payload.user_id)
        .await?;
    Ok(Json(views::expense(expense)))
}

pub async fn update(
    Extension(payload): Extension<Payload>,
    State(state): State<ServerState>,
    Path((group_id, expense_id)): Path<(i64, i64)>,
    Json(body): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .engine
        .update_expense(
            group_id,
            payload.user_id,
            UpdateExpenseParams {
                id: expense_id,
                amount_cents: body.amount_cents,
                description: body.description,
            },
        )
        .await?;
    Ok(Json(views::expense(expense)))
}

pub async fn delete(
    Extension(payload): Extension<Payload>,
    State(state): State<ServerState>,
    Path((group_id, expense_id)): Path<(i64, i64)>,
) -> Result<Json<ExpenseDeleted>, ServerError> {
    state
        .engine
        .delete_expense(group_id, expense_id, payload.user_id)
        .await?;
    Ok(Json(ExpenseDeleted { id: expense_id }))
}
