use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `?limit=&offset=` on list endpoints.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod user {
    use super::*;

    /// Public view of a user. Never carries the password hash.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i64,
        pub first_name: String,
        pub last_name: String,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub image_path: String,
        pub time_zone: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub first_name: String,
        #[serde(default)]
        pub last_name: String,
        pub email: String,
        pub phone: Option<String>,
        pub password: String,
        #[serde(default)]
        pub image_path: String,
        #[serde(default = "default_time_zone")]
        pub time_zone: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub access_token: String,
        pub access_token_expires_at: DateTime<Utc>,
        pub user: UserView,
    }

    pub(crate) fn default_time_zone() -> String {
        "UTC".to_string()
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: i64,
        pub name: String,
    }
}

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        pub category_id: i64,
        #[serde(default)]
        pub image_path: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: i64,
        pub name: String,
        pub category_id: i64,
        pub image_path: String,
        pub created_by_id: i64,
        pub created_at: DateTime<Utc>,
    }

    /// Response of `POST /groups`: the group and the owner's membership.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupCreated {
        pub group: GroupView,
        pub membership: super::member::MembershipView,
    }

    /// Request body of `PUT /groups/{id}`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupUpdate {
        pub name: String,
        pub category_id: i64,
        #[serde(default)]
        pub image_path: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupDeleted {
        pub group_id: i64,
        pub memberships_removed: u64,
        pub invitations_removed: u64,
        pub expenses_removed: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupsResponse {
        pub groups: Vec<GroupView>,
    }
}

pub mod member {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MembershipView {
        pub id: i64,
        pub group_id: i64,
        pub user_id: i64,
        pub created_at: DateTime<Utc>,
    }

    /// A membership together with the member.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub membership: MembershipView,
        pub user: super::user::UserView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<MemberView>,
    }

    /// Request body for inviting someone into a group by phone number.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberInvite {
        pub first_name: String,
        #[serde(default)]
        pub last_name: String,
        pub phone: String,
        pub email: Option<String>,
        #[serde(default = "super::user::default_time_zone")]
        pub time_zone: String,
    }

    /// Response of an invite. The invitation code is not part of it: only
    /// the invitee receives the code.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberInvited {
        pub membership: MembershipView,
        pub user: super::user::UserView,
        pub invitation: super::invitation::InvitationView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberRemoved {
        pub membership: MembershipView,
        pub invitations_rejected: u64,
    }
}

pub mod invitation {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum InvitationStatus {
        Pending,
        Accepted,
        Rejected,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct InvitationView {
        pub id: i64,
        pub inviter_id: i64,
        pub invitee_id: i64,
        pub group_id: i64,
        pub status: InvitationStatus,
        pub created_at: DateTime<Utc>,
        pub accepted_at: Option<DateTime<Utc>>,
        pub rejected_at: Option<DateTime<Utc>>,
    }

    /// Who an invitation code was issued to, before accepting.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PendingInvitee {
        pub invitation_id: i64,
        pub group_id: i64,
        pub first_name: String,
        pub last_name: String,
        pub phone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvitationAccept {
        pub code: String,
        pub first_name: String,
        #[serde(default)]
        pub last_name: String,
        pub email: String,
        pub password: String,
        #[serde(default)]
        pub image_path: String,
        #[serde(default = "super::user::default_time_zone")]
        pub time_zone: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvitationAccepted {
        pub invitation: InvitationView,
        pub user: super::user::UserView,
    }
}

pub mod expense {
    use super::*;

    /// Request body of `POST /groups/{id}/expenses`. The payer defaults to
    /// the caller.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub paid_by_id: Option<i64>,
        pub amount_cents: i64,
        #[serde(default)]
        pub description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub amount_cents: i64,
        #[serde(default)]
        pub description: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: i64,
        pub group_id: i64,
        pub paid_by_id: i64,
        pub amount_cents: i64,
        pub description: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpensesResponse {
        pub expenses: Vec<ExpenseView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseDeleted {
        pub id: i64,
    }
}
