//! Group endpoints. Reads need membership; changes need ownership.

use api_types::{
    Pagination,
    group::{GroupCreated, GroupDeleted, GroupNew, GroupUpdate, GroupView, GroupsResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{CreateGroupParams, DeleteGroupParams, UpdateGroupParams};
use token::Payload;

use crate::{ServerError, server::ServerState, views};

pub async fn list(
    Extension(payload): Extension<Payload>,
    State(state): State<ServerState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<GroupsResponse>, ServerError> {
    let groups = state
        .engine
        .list_groups(payload.user_id, views::page(pagination))
        .await?
        .into_iter()
        .map(views::group)
        .collect();
    Ok(Json(GroupsResponse { groups }))
}

pub async fn create(
    Extension(payload): Extension<Payload>,
    State(state): State<ServerState>,
    Json(body): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupCreated>), ServerError> {
    let created = state
        .engine
        .create_group(CreateGroupParams {
            name: body.name,
            category_id: body.category_id,
            created_by_id: payload.user_id,
            image_path: body.image_path,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GroupCreated {
            group: views::group(created.group),
            membership: views::membership(created.membership),
        }),
    ))
}

pub async fn get(
    Extension(payload): Extension<Payload>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state.engine.group(id, payload.user_id).await?;
    Ok(Json(views::group(group)))
}

pub async fn update(
    Extension(payload): Extension<Payload>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(body): Json<GroupUpdate>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state
        .engine
        .update_group(UpdateGroupParams {
            id,
            created_by_id: payload.user_id,
            name: body.name,
            category_id: body.category_id,
            image_path: body.image_path,
        })
        .await?;
    Ok(Json(views::group(group)))
}

pub async fn delete(
    Extension(payload): Extension<Payload>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<GroupDeleted>, ServerError> {
    let deleted = state
        .engine
        .delete_group(DeleteGroupParams {
            id,
            created_by_id: payload.user_id,
        })
        .await?;
    Ok(Json(GroupDeleted {
        group_id: deleted.group_id,
        memberships_removed: deleted.memberships_removed,
        invitations_removed: deleted.invitations_removed,
        expenses_removed: deleted.expenses_removed,
    }))
}
