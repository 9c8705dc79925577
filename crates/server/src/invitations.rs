//! Invitation endpoints. Reading and accepting by code is public: the code
//! itself authorizes the caller.

use api_types::invitation::{InvitationAccept, InvitationAccepted, InvitationView, PendingInvitee};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::AcceptInvitationParams;
use token::Payload;

use crate::{ServerError, server::ServerState, views};

pub async fn pending(
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> Result<Json<PendingInvitee>, ServerError> {
    let (invitation, user) = state.engine.pending_invitee(&code).await?;
    Ok(Json(PendingInvitee {
        invitation_id: invitation.id,
        group_id: invitation.group_id,
        first_name: user.first_name,
        last_name: user.last_name,
        phone: user.phone,
    }))
}

pub async fn accept(
    State(state): State<ServerState>,
    Json(body): Json<InvitationAccept>,
) -> Result<Json<InvitationAccepted>, ServerError> {
    let accepted = state
        .engine
        .accept_invitation(AcceptInvitationParams {
            code: body.code,
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            password: body.password,
            image_path: body.image_path,
            time_zone: body.time_zone,
        })
        .await?;

    Ok(Json(InvitationAccepted {
        invitation: views::invitation(accepted.invitation),
        user: views::user(accepted.user),
    }))
}

/// Latest invitation of a user into a group; owner only.
pub async fn current(
    Extension(payload): Extension<Payload>,
    State(state): State<ServerState>,
    Path((group_id, invitee_id)): Path<(i64, i64)>,
) -> Result<Json<InvitationView>, ServerError> {
    let invitation = state
        .engine
        .current_invitation(group_id, invitee_id, payload.user_id)
        .await?;
    Ok(Json(views::invitation(invitation)))
}
