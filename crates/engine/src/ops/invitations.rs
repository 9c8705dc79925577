use async_trait::async_trait;
use chrono::Utc;

use crate::{
    EngineError, ResultEngine, WorkflowError,
    credentials::{hash_password, random_string},
    group_members, groups,
    invitations::{self, InvitationStatus},
    queries::{
        CreateGroupMemberParams, CreateInvitationParams, CreateUserParams, UpdateInvitationParams,
        UpdateUserParams,
    },
    users,
    workflow::{Step, TxContext, Workflow, WorkflowState, produced},
};

use super::{
    Engine, access::require_group_owner, normalize_optional_text, normalize_required_name,
    validate_password,
};

const INVITE_USER: &str = "provision_invited_user";
const ACCEPT_INVITATION: &str = "accept_invitation";
const INVITATION_CODE_LEN: usize = 32;
const PLACEHOLDER_PASSWORD_LEN: usize = 24;

/// Who to invite into which group. The invitee is identified by phone.
#[derive(Clone, Debug)]
pub struct InviteUserParams {
    pub group_id: i64,
    pub inviter_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub time_zone: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserInvited {
    pub membership: group_members::Model,
    pub user: users::Model,
    pub invitation: invitations::Model,
}

/// Profile an invitee completes when accepting.
#[derive(Clone, Debug)]
pub struct AcceptInvitationParams {
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub image_path: String,
    pub time_zone: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvitationAccepted {
    pub invitation: invitations::Model,
    pub user: users::Model,
}

#[derive(Default)]
struct InviteState {
    group: Option<groups::Model>,
    user: Option<users::Model>,
    invitee_created: bool,
    invitation: Option<invitations::Model>,
    membership: Option<group_members::Model>,
}

impl WorkflowState for InviteState {
    type Output = UserInvited;

    fn into_output(self) -> Option<UserInvited> {
        Some(UserInvited {
            membership: self.membership?,
            user: self.user?,
            invitation: self.invitation?,
        })
    }
}

struct RequireOwner {
    group_id: i64,
    inviter_id: i64,
}

#[async_trait]
impl Step<InviteState> for RequireOwner {
    fn name(&self) -> &'static str {
        "require_group_owner"
    }

    async fn run(&self, cx: &TxContext<'_>, state: &mut InviteState) -> ResultEngine<()> {
        let group = require_group_owner(&cx.queries(), self.group_id, self.inviter_id).await?;
        state.group = Some(group);
        Ok(())
    }
}

/// Reuses the user holding the phone number, or creates one with an
/// unusable random password until the invitation is accepted.
struct FindOrCreateInvitee {
    first_name: String,
    last_name: String,
    phone: String,
    email: Option<String>,
    time_zone: String,
}

#[async_trait]
impl Step<InviteState> for FindOrCreateInvitee {
    fn name(&self) -> &'static str {
        "find_or_create_invitee"
    }

    async fn run(&self, cx: &TxContext<'_>, state: &mut InviteState) -> ResultEngine<()> {
        let queries = cx.queries();
        let user = match queries.get_user_by_phone(&self.phone).await {
            Ok(user) => user,
            Err(EngineError::KeyNotFound(_)) => {
                state.invitee_created = true;
                let params = CreateUserParams {
                    first_name: self.first_name.clone(),
                    last_name: self.last_name.clone(),
                    email: self.email.clone(),
                    phone: Some(self.phone.clone()),
                    password_hash: hash_password(&random_string(PLACEHOLDER_PASSWORD_LEN)),
                    image_path: String::new(),
                    time_zone: self.time_zone.clone(),
                };
                queries.create_user(params).await?
            }
            Err(err) => return Err(err),
        };
        state.user = Some(user);
        Ok(())
    }
}

struct CreateInvitation {
    inviter_id: i64,
}

#[async_trait]
impl Step<InviteState> for CreateInvitation {
    fn name(&self) -> &'static str {
        "create_invitation"
    }

    async fn run(&self, cx: &TxContext<'_>, state: &mut InviteState) -> ResultEngine<()> {
        let group = produced(&state.group, "require_group_owner")?;
        let user = produced(&state.user, "find_or_create_invitee")?;
        let params = CreateInvitationParams {
            inviter_id: self.inviter_id,
            invitee_id: user.id,
            group_id: group.id,
            status: InvitationStatus::Pending,
            code: random_string(INVITATION_CODE_LEN),
            invitee_created: state.invitee_created,
        };
        state.invitation = Some(cx.queries().create_invitation(params).await?);
        Ok(())
    }
}

/// Adds the invitee to the group; an existing membership aborts the workflow.
struct AddInviteeMembership;

#[async_trait]
impl Step<InviteState> for AddInviteeMembership {
    fn name(&self) -> &'static str {
        "add_invitee_membership"
    }

    async fn run(&self, cx: &TxContext<'_>, state: &mut InviteState) -> ResultEngine<()> {
        let group = produced(&state.group, "require_group_owner")?;
        let user = produced(&state.user, "find_or_create_invitee")?;
        let params = CreateGroupMemberParams {
            group_id: group.id,
            user_id: user.id,
        };
        state.membership = Some(cx.queries().create_group_member(params).await?);
        Ok(())
    }
}

#[derive(Default)]
struct AcceptState {
    invitation: Option<invitations::Model>,
    user: Option<users::Model>,
}

impl WorkflowState for AcceptState {
    type Output = InvitationAccepted;

    fn into_output(self) -> Option<InvitationAccepted> {
        Some(InvitationAccepted {
            invitation: self.invitation?,
            user: self.user?,
        })
    }
}

struct MarkAccepted {
    code: String,
}

#[async_trait]
impl Step<AcceptState> for MarkAccepted {
    fn name(&self) -> &'static str {
        "accept_invitation"
    }

    async fn run(&self, cx: &TxContext<'_>, state: &mut AcceptState) -> ResultEngine<()> {
        let queries = cx.queries();
        let invitation = queries.get_invitation_by_code(&self.code).await?;
        if invitation.status != InvitationStatus::Pending {
            return Err(EngineError::InvalidInput(
                "invitation is not pending".to_string(),
            ));
        }
        let params = UpdateInvitationParams {
            id: invitation.id,
            status: InvitationStatus::Accepted,
            at: Utc::now(),
        };
        state.invitation = Some(queries.update_invitation(params).await?);
        Ok(())
    }
}

/// Sets the profile of an account the invitation provisioned. An account
/// that existed before the invitation is left untouched.
struct CompleteInviteeProfile {
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    image_path: String,
    time_zone: String,
}

#[async_trait]
impl Step<AcceptState> for CompleteInviteeProfile {
    fn name(&self) -> &'static str {
        "complete_invitee_profile"
    }

    async fn run(&self, cx: &TxContext<'_>, state: &mut AcceptState) -> ResultEngine<()> {
        let invitation = produced(&state.invitation, "accept_invitation")?;
        if !invitation.invitee_created {
            state.user = Some(cx.queries().get_user(invitation.invitee_id).await?);
            return Ok(());
        }
        let params = UpdateUserParams {
            id: invitation.invitee_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: Some(self.email.clone()),
            password_hash: self.password_hash.clone(),
            image_path: self.image_path.clone(),
            time_zone: self.time_zone.clone(),
        };
        state.user = Some(cx.queries().update_user(params).await?);
        Ok(())
    }
}

impl Engine {
    /// Invite someone into a group by phone number.
    ///
    /// Only the group owner may invite. The invitee user is reused when the
    /// phone is already registered, otherwise created. The user, the pending
    /// invitation, and the membership are written in one transaction.
    pub async fn invite_user(&self, params: InviteUserParams) -> Result<UserInvited, WorkflowError> {
        let reject = |cause| WorkflowError::Rejected {
            workflow: INVITE_USER,
            cause,
        };
        let phone = normalize_required_name(&params.phone, "phone").map_err(reject)?;
        let first_name = normalize_required_name(&params.first_name, "first name").map_err(reject)?;

        let workflow = Workflow::new(INVITE_USER)
            .step(RequireOwner {
                group_id: params.group_id,
                inviter_id: params.inviter_id,
            })
            .step(FindOrCreateInvitee {
                first_name,
                last_name: params.last_name.trim().to_string(),
                phone,
                email: normalize_optional_text(params.email.as_deref()),
                time_zone: params.time_zone,
            })
            .step(CreateInvitation {
                inviter_id: params.inviter_id,
            })
            .step(AddInviteeMembership);
        self.execute(&workflow, InviteState::default()).await
    }

    /// Accept a pending invitation.
    ///
    /// When the invitation provisioned the invitee, the given email and
    /// password become the account's credentials. For an invitee who was
    /// already registered only the invitation status changes.
    pub async fn accept_invitation(
        &self,
        params: AcceptInvitationParams,
    ) -> Result<InvitationAccepted, WorkflowError> {
        let reject = |cause| WorkflowError::Rejected {
            workflow: ACCEPT_INVITATION,
            cause,
        };
        let first_name = normalize_required_name(&params.first_name, "first name").map_err(reject)?;
        let email = normalize_required_name(&params.email, "email").map_err(reject)?;
        validate_password(&params.password).map_err(reject)?;

        let workflow = Workflow::new(ACCEPT_INVITATION)
            .step(MarkAccepted { code: params.code })
            .step(CompleteInviteeProfile {
                first_name,
                last_name: params.last_name.trim().to_string(),
                email,
                password_hash: hash_password(&params.password),
                image_path: params.image_path.trim().to_string(),
                time_zone: params.time_zone,
            });
        self.execute(&workflow, AcceptState::default()).await
    }

    /// The invitation behind `code` together with the invited user, for the
    /// sign-up form shown before accepting.
    pub async fn pending_invitee(
        &self,
        code: &str,
    ) -> ResultEngine<(invitations::Model, users::Model)> {
        let queries = self.queries();
        let invitation = queries.get_invitation_by_code(code).await?;
        if invitation.status != InvitationStatus::Pending {
            return Err(EngineError::InvalidInput(
                "invitation is not pending".to_string(),
            ));
        }
        let user = queries.get_user(invitation.invitee_id).await?;
        Ok((invitation, user))
    }

    /// Latest invitation of `invitee_id` into a group, for its owner.
    pub async fn current_invitation(
        &self,
        group_id: i64,
        invitee_id: i64,
        user_id: i64,
    ) -> ResultEngine<invitations::Model> {
        let queries = self.queries();
        require_group_owner(&queries, group_id, user_id).await?;
        queries.get_current_invitation(group_id, invitee_id).await
    }
}
