use async_trait::async_trait;
use chrono::Utc;

use crate::{
    EngineError, ResultEngine, WorkflowError, group_members, groups,
    queries::{
        CreateGroupMemberParams, CreateGroupParams, DeleteGroupParams, Page, UpdateGroupParams,
    },
    users,
    workflow::{Step, TxContext, Workflow, WorkflowState, produced},
};

use super::{
    Engine,
    access::{require_group_member, require_group_owner},
    normalize_required_name,
};

const CREATE_GROUP: &str = "create_group_with_owner";
const DELETE_GROUP: &str = "delete_group_cascade";
const REMOVE_MEMBER: &str = "remove_group_member";

/// A new group together with its creator's membership.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupCreated {
    pub group: groups::Model,
    pub membership: group_members::Model,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupDeleted {
    pub group_id: i64,
    pub memberships_removed: u64,
    pub invitations_removed: u64,
    pub expenses_removed: u64,
}

/// A membership taken out of its group, with the invitations it cancelled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRemoved {
    pub membership: group_members::Model,
    pub invitations_rejected: u64,
}

#[derive(Default)]
struct CreateGroupState {
    group: Option<groups::Model>,
    membership: Option<group_members::Model>,
}

impl WorkflowState for CreateGroupState {
    type Output = GroupCreated;

    fn into_output(self) -> Option<GroupCreated> {
        Some(GroupCreated {
            group: self.group?,
            membership: self.membership?,
        })
    }
}

struct InsertGroup(CreateGroupParams);

#[async_trait]
impl Step<CreateGroupState> for InsertGroup {
    fn name(&self) -> &'static str {
        "create_group"
    }

    async fn run(&self, cx: &TxContext<'_>, state: &mut CreateGroupState) -> ResultEngine<()> {
        state.group = Some(cx.queries().create_group(self.0.clone()).await?);
        Ok(())
    }
}

/// Makes the creator a member, using the id the previous step produced.
struct AddOwnerMembership;

#[async_trait]
impl Step<CreateGroupState> for AddOwnerMembership {
    fn name(&self) -> &'static str {
        "add_owner_membership"
    }

    async fn run(&self, cx: &TxContext<'_>, state: &mut CreateGroupState) -> ResultEngine<()> {
        let group = produced(&state.group, "create_group")?;
        let params = CreateGroupMemberParams {
            group_id: group.id,
            user_id: group.created_by_id,
        };
        state.membership = Some(cx.queries().create_group_member(params).await?);
        Ok(())
    }
}

#[derive(Default)]
struct DeleteGroupState {
    memberships_removed: Option<u64>,
    invitations_removed: Option<u64>,
    expenses_removed: Option<u64>,
    group_id: Option<i64>,
}

impl WorkflowState for DeleteGroupState {
    type Output = GroupDeleted;

    fn into_output(self) -> Option<GroupDeleted> {
        Some(GroupDeleted {
            group_id: self.group_id?,
            memberships_removed: self.memberships_removed?,
            invitations_removed: self.invitations_removed?,
            expenses_removed: self.expenses_removed?,
        })
    }
}

struct RemoveMembers {
    group_id: i64,
}

#[async_trait]
impl Step<DeleteGroupState> for RemoveMembers {
    fn name(&self) -> &'static str {
        "delete_group_members"
    }

    async fn run(&self, cx: &TxContext<'_>, state: &mut DeleteGroupState) -> ResultEngine<()> {
        state.memberships_removed = Some(cx.queries().delete_group_members(self.group_id).await?);
        Ok(())
    }
}

struct RemoveInvitations {
    group_id: i64,
}

#[async_trait]
impl Step<DeleteGroupState> for RemoveInvitations {
    fn name(&self) -> &'static str {
        "delete_group_invitations"
    }

    async fn run(&self, cx: &TxContext<'_>, state: &mut DeleteGroupState) -> ResultEngine<()> {
        state.invitations_removed =
            Some(cx.queries().delete_group_invitations(self.group_id).await?);
        Ok(())
    }
}

struct RemoveExpenses {
    group_id: i64,
}

#[async_trait]
impl Step<DeleteGroupState> for RemoveExpenses {
    fn name(&self) -> &'static str {
        "delete_group_expenses"
    }

    async fn run(&self, cx: &TxContext<'_>, state: &mut DeleteGroupState) -> ResultEngine<()> {
        state.expenses_removed = Some(cx.queries().delete_group_expenses(self.group_id).await?);
        Ok(())
    }
}

/// Deletes the group itself, scoped to its owner. A missing group (or one
/// owned by someone else) fails here, undoing the deletions before it.
struct RemoveGroup(DeleteGroupParams);

#[async_trait]
impl Step<DeleteGroupState> for RemoveGroup {
    fn name(&self) -> &'static str {
        "delete_group"
    }

    async fn run(&self, cx: &TxContext<'_>, state: &mut DeleteGroupState) -> ResultEngine<()> {
        cx.queries().delete_group(self.0).await?;
        state.group_id = Some(self.0.id);
        Ok(())
    }
}

#[derive(Default)]
struct RemoveMemberState {
    membership: Option<group_members::Model>,
    invitations_rejected: Option<u64>,
}

impl WorkflowState for RemoveMemberState {
    type Output = MemberRemoved;

    fn into_output(self) -> Option<MemberRemoved> {
        Some(MemberRemoved {
            membership: self.membership?,
            invitations_rejected: self.invitations_rejected?,
        })
    }
}

/// The owner may remove anyone but themselves; a member may only leave.
struct LoadRemovableMember {
    group_id: i64,
    membership_id: i64,
    user_id: i64,
}

#[async_trait]
impl Step<RemoveMemberState> for LoadRemovableMember {
    fn name(&self) -> &'static str {
        "load_group_member"
    }

    async fn run(&self, cx: &TxContext<'_>, state: &mut RemoveMemberState) -> ResultEngine<()> {
        let queries = cx.queries();
        let group = queries.get_group(self.group_id).await?;
        let membership = queries.get_group_member_by_id(self.membership_id).await?;
        if membership.group_id != group.id {
            return Err(EngineError::KeyNotFound("group member".to_string()));
        }
        if membership.user_id == group.created_by_id {
            return Err(EngineError::InvalidInput(
                "the group owner cannot be removed".to_string(),
            ));
        }
        if self.user_id != group.created_by_id && self.user_id != membership.user_id {
            return Err(EngineError::Forbidden(
                "only the group owner can remove other members".to_string(),
            ));
        }
        state.membership = Some(membership);
        Ok(())
    }
}

struct DeleteMembership;

#[async_trait]
impl Step<RemoveMemberState> for DeleteMembership {
    fn name(&self) -> &'static str {
        "delete_group_member"
    }

    async fn run(&self, cx: &TxContext<'_>, state: &mut RemoveMemberState) -> ResultEngine<()> {
        let membership = produced(&state.membership, "load_group_member")?;
        cx.queries().delete_group_member(membership.id).await
    }
}

/// A removed member's pending invitations into the group can no longer be
/// accepted.
struct RejectPendingInvitations;

#[async_trait]
impl Step<RemoveMemberState> for RejectPendingInvitations {
    fn name(&self) -> &'static str {
        "reject_pending_invitations"
    }

    async fn run(&self, cx: &TxContext<'_>, state: &mut RemoveMemberState) -> ResultEngine<()> {
        let membership = produced(&state.membership, "load_group_member")?;
        let rejected = cx
            .queries()
            .reject_pending_invitations(membership.group_id, membership.user_id, Utc::now())
            .await?;
        state.invitations_rejected = Some(rejected);
        Ok(())
    }
}

impl Engine {
    /// Create a group and make its creator the first member, atomically.
    pub async fn create_group(
        &self,
        params: CreateGroupParams,
    ) -> Result<GroupCreated, WorkflowError> {
        let name = normalize_required_name(&params.name, "group name").map_err(|cause| {
            WorkflowError::Rejected {
                workflow: CREATE_GROUP,
                cause,
            }
        })?;
        let params = CreateGroupParams {
            name,
            image_path: params.image_path.trim().to_string(),
            ..params
        };

        let workflow = Workflow::new(CREATE_GROUP)
            .step(InsertGroup(params))
            .step(AddOwnerMembership);
        self.execute(&workflow, CreateGroupState::default()).await
    }

    /// Rename a group or move it to another category. Owner only.
    pub async fn update_group(&self, params: UpdateGroupParams) -> ResultEngine<groups::Model> {
        let name = normalize_required_name(&params.name, "group name")?;
        let queries = self.queries();
        require_group_owner(&queries, params.id, params.created_by_id).await?;
        let group = queries
            .update_group(UpdateGroupParams {
                name,
                image_path: params.image_path.trim().to_string(),
                ..params
            })
            .await?;
        tracing::info!(group_id = group.id, "group updated");
        Ok(group)
    }

    /// Delete a group with its memberships, invitations and expenses,
    /// children first.
    ///
    /// Fails with a not-found step error when `params.id` does not name a
    /// group owned by `params.created_by_id`; nothing is deleted then.
    pub async fn delete_group(
        &self,
        params: DeleteGroupParams,
    ) -> Result<GroupDeleted, WorkflowError> {
        let workflow = Workflow::new(DELETE_GROUP)
            .step(RemoveMembers {
                group_id: params.id,
            })
            .step(RemoveInvitations {
                group_id: params.id,
            })
            .step(RemoveExpenses {
                group_id: params.id,
            })
            .step(RemoveGroup(params));
        self.execute(&workflow, DeleteGroupState::default()).await
    }

    /// Take a membership out of its group and reject the member's pending
    /// invitations into it, atomically.
    pub async fn remove_group_member(
        &self,
        group_id: i64,
        membership_id: i64,
        user_id: i64,
    ) -> Result<MemberRemoved, WorkflowError> {
        let workflow = Workflow::new(REMOVE_MEMBER)
            .step(LoadRemovableMember {
                group_id,
                membership_id,
                user_id,
            })
            .step(DeleteMembership)
            .step(RejectPendingInvitations);
        self.execute(&workflow, RemoveMemberState::default()).await
    }

    /// A group visible to `user_id` (any member, owner included).
    pub async fn group(&self, group_id: i64, user_id: i64) -> ResultEngine<groups::Model> {
        require_group_member(&self.queries(), group_id, user_id).await
    }

    /// Groups `user_id` belongs to.
    pub async fn list_groups(&self, user_id: i64, page: Page) -> ResultEngine<Vec<groups::Model>> {
        self.queries().list_groups_for_member(user_id, page).await
    }

    /// Members of a group, readable by its members only.
    pub async fn list_group_members(
        &self,
        group_id: i64,
        user_id: i64,
        page: Page,
    ) -> ResultEngine<Vec<(group_members::Model, users::Model)>> {
        let queries = self.queries();
        require_group_member(&queries, group_id, user_id).await?;
        queries.list_group_members(group_id, page).await
    }
}
