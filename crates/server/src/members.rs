//! Group membership endpoints. Inviting is owner-only; members may leave.

use api_types::{
    Pagination,
    member::{MemberInvite, MemberInvited, MemberRemoved, MemberView, MembersResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::InviteUserParams;
use token::Payload;

use crate::{ServerError, server::ServerState, views};

pub async fn list(
    Extension(payload): Extension<Payload>,
    State(state): State<ServerState>,
    Path(group_id): Path<i64>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<MembersResponse>, ServerError> {
    let members = state
        .engine
        .list_group_members(group_id, payload.user_id, views::page(pagination))
        .await?
        .into_iter()
        .map(|(membership, user)| MemberView {
            membership: views::membership(membership),
            user: views::user(user),
        })
        .collect();

    Ok(Json(MembersResponse { members }))
}

/// Invite someone by phone; an unknown phone provisions a new user.
pub async fn invite(
    Extension(payload): Extension<Payload>,
    State(state): State<ServerState>,
    Path(group_id): Path<i64>,
    Json(body): Json<MemberInvite>,
) -> Result<(StatusCode, Json<MemberInvited>), ServerError> {
    let invited = state
        .engine
        .invite_user(InviteUserParams {
            group_id,
            inviter_id: payload.user_id,
            first_name: body.first_name,
            last_name: body.last_name,
            phone: body.phone,
            email: body.email,
            time_zone: body.time_zone,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MemberInvited {
            membership: views::membership(invited.membership),
            user: views::user(invited.user),
            invitation: views::invitation(invited.invitation),
        }),
    ))
}

pub async fn remove(
    Extension(payload): Extension<Payload>,
    State(state): State<ServerState>,
    Path((group_id, membership_id)): Path<(i64, i64)>,
) -> Result<Json<MemberRemoved>, ServerError> {
    let removed = state
        .engine
        .remove_group_member(group_id, membership_id, payload.user_id)
        .await?;
    Ok(Json(MemberRemoved {
        membership: views::membership(removed.membership),
        invitations_rejected: removed.invitations_rejected,
    }))
}
