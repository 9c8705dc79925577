//! Single-row operations, one statement each.
//!
//! [`Queries`] borrows any sea-orm connection: the pool for plain reads, or a
//! [`DatabaseTransaction`] when a workflow step runs it through a
//! [`TxContext`].
//!
//!  [`DatabaseTransaction`]: sea_orm::DatabaseTransaction
//!  [`TxContext`]: crate::TxContext
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, prelude::*,
};

use crate::{
    EngineError, ResultEngine, categories, expenses, group_members, groups,
    invitations::{self, InvitationStatus},
    users,
};

#[derive(Clone, Debug)]
pub struct CreateUserParams {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password_hash: String,
    pub image_path: String,
    pub time_zone: String,
}

#[derive(Clone, Debug)]
pub struct UpdateUserParams {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub image_path: String,
    pub time_zone: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateGroupParams {
    pub name: String,
    pub category_id: i64,
    pub created_by_id: i64,
    pub image_path: String,
}

/// New values for a group, applied only when `created_by_id` owns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateGroupParams {
    pub id: i64,
    pub created_by_id: i64,
    pub name: String,
    pub category_id: i64,
    pub image_path: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeleteGroupParams {
    pub id: i64,
    pub created_by_id: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreateGroupMemberParams {
    pub group_id: i64,
    pub user_id: i64,
}

#[derive(Clone, Debug)]
pub struct CreateInvitationParams {
    pub inviter_id: i64,
    pub invitee_id: i64,
    pub group_id: i64,
    pub status: InvitationStatus,
    pub code: String,
    pub invitee_created: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct UpdateInvitationParams {
    pub id: i64,
    pub status: InvitationStatus,
    pub at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateExpenseParams {
    pub group_id: i64,
    pub paid_by_id: i64,
    pub amount_cents: i64,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateExpenseParams {
    pub id: i64,
    pub amount_cents: i64,
    pub description: String,
}

/// Limit/offset window for list operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

pub struct Queries<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> Queries<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub async fn create_user(&self, params: CreateUserParams) -> ResultEngine<users::Model> {
        users::ActiveModel {
            first_name: ActiveValue::Set(params.first_name),
            last_name: ActiveValue::Set(params.last_name),
            email: ActiveValue::Set(params.email),
            phone: ActiveValue::Set(params.phone),
            password_hash: ActiveValue::Set(params.password_hash),
            image_path: ActiveValue::Set(params.image_path),
            time_zone: ActiveValue::Set(params.time_zone),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(|err| EngineError::from_write(err, "user"))
    }

    pub async fn get_user(&self, id: i64) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user".to_string()))
    }

    pub async fn get_user_by_email(&self, email: &str) -> ResultEngine<users::Model> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(self.db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user".to_string()))
    }

    pub async fn get_user_by_phone(&self, phone: &str) -> ResultEngine<users::Model> {
        users::Entity::find()
            .filter(users::Column::Phone.eq(phone))
            .one(self.db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user".to_string()))
    }

    pub async fn update_user(&self, params: UpdateUserParams) -> ResultEngine<users::Model> {
        users::ActiveModel {
            id: ActiveValue::Unchanged(params.id),
            first_name: ActiveValue::Set(params.first_name),
            last_name: ActiveValue::Set(params.last_name),
            email: ActiveValue::Set(params.email),
            password_hash: ActiveValue::Set(params.password_hash),
            image_path: ActiveValue::Set(params.image_path),
            time_zone: ActiveValue::Set(params.time_zone),
            ..Default::default()
        }
        .update(self.db)
        .await
        .map_err(|err| EngineError::from_write(err, "user"))
    }

    pub async fn create_category(&self, name: &str) -> ResultEngine<categories::Model> {
        categories::ActiveModel {
            name: ActiveValue::Set(name.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(|err| EngineError::from_write(err, "category"))
    }

    pub async fn list_categories(&self) -> ResultEngine<Vec<categories::Model>> {
        categories::Entity::find()
            .order_by_asc(categories::Column::Id)
            .all(self.db)
            .await
            .map_err(Into::into)
    }

    pub async fn create_group(&self, params: CreateGroupParams) -> ResultEngine<groups::Model> {
        groups::ActiveModel {
            name: ActiveValue::Set(params.name),
            category_id: ActiveValue::Set(params.category_id),
            image_path: ActiveValue::Set(params.image_path),
            created_by_id: ActiveValue::Set(params.created_by_id),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(|err| EngineError::from_write(err, "group"))
    }

    pub async fn get_group(&self, id: i64) -> ResultEngine<groups::Model> {
        groups::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("group".to_string()))
    }

    /// Groups `user_id` is a member of, oldest first.
    pub async fn list_groups_for_member(
        &self,
        user_id: i64,
        page: Page,
    ) -> ResultEngine<Vec<groups::Model>> {
        groups::Entity::find()
            .join(JoinType::InnerJoin, groups::Relation::Members.def())
            .filter(group_members::Column::UserId.eq(user_id))
            .order_by_asc(groups::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(self.db)
            .await
            .map_err(Into::into)
    }

    /// Rewrite a group owned by `params.created_by_id`. Fails with
    /// [`EngineError::KeyNotFound`] when there is no such group.
    pub async fn update_group(&self, params: UpdateGroupParams) -> ResultEngine<groups::Model> {
        let result = groups::Entity::update_many()
            .col_expr(groups::Column::Name, Expr::value(params.name))
            .col_expr(groups::Column::CategoryId, Expr::value(params.category_id))
            .col_expr(groups::Column::ImagePath, Expr::value(params.image_path))
            .filter(groups::Column::Id.eq(params.id))
            .filter(groups::Column::CreatedById.eq(params.created_by_id))
            .exec(self.db)
            .await
            .map_err(|err| EngineError::from_write(err, "group"))?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("group".to_string()));
        }
        self.get_group(params.id).await
    }

    /// Delete a group owned by `created_by_id`. Fails with
    /// [`EngineError::KeyNotFound`] when no such group exists for that owner.
    pub async fn delete_group(&self, params: DeleteGroupParams) -> ResultEngine<()> {
        let result = groups::Entity::delete_many()
            .filter(groups::Column::Id.eq(params.id))
            .filter(groups::Column::CreatedById.eq(params.created_by_id))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("group".to_string()));
        }
        Ok(())
    }

    pub async fn create_group_member(
        &self,
        params: CreateGroupMemberParams,
    ) -> ResultEngine<group_members::Model> {
        group_members::ActiveModel {
            group_id: ActiveValue::Set(params.group_id),
            user_id: ActiveValue::Set(params.user_id),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(|err| EngineError::from_write(err, "group member"))
    }

    pub async fn get_group_member(
        &self,
        group_id: i64,
        user_id: i64,
    ) -> ResultEngine<group_members::Model> {
        group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .filter(group_members::Column::UserId.eq(user_id))
            .one(self.db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("group member".to_string()))
    }

    pub async fn get_group_member_by_id(&self, id: i64) -> ResultEngine<group_members::Model> {
        group_members::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("group member".to_string()))
    }

    pub async fn delete_group_member(&self, id: i64) -> ResultEngine<()> {
        let result = group_members::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("group member".to_string()));
        }
        Ok(())
    }

    /// Members of a group together with their user record.
    pub async fn list_group_members(
        &self,
        group_id: i64,
        page: Page,
    ) -> ResultEngine<Vec<(group_members::Model, users::Model)>> {
        let rows = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .find_also_related(users::Entity)
            .order_by_asc(group_members::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(self.db)
            .await?;

        rows.into_iter()
            .map(|(member, user)| {
                user.map(|user| (member, user))
                    .ok_or_else(|| EngineError::KeyNotFound("user".to_string()))
            })
            .collect()
    }

    /// Delete every membership of a group, returning how many were removed.
    pub async fn delete_group_members(&self, group_id: i64) -> ResultEngine<u64> {
        let result = group_members::Entity::delete_many()
            .filter(group_members::Column::GroupId.eq(group_id))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn create_invitation(
        &self,
        params: CreateInvitationParams,
    ) -> ResultEngine<invitations::Model> {
        invitations::ActiveModel {
            inviter_id: ActiveValue::Set(params.inviter_id),
            invitee_id: ActiveValue::Set(params.invitee_id),
            group_id: ActiveValue::Set(params.group_id),
            status: ActiveValue::Set(params.status),
            code: ActiveValue::Set(params.code),
            invitee_created: ActiveValue::Set(params.invitee_created),
            created_at: ActiveValue::Set(Utc::now()),
            accepted_at: ActiveValue::Set(None),
            rejected_at: ActiveValue::Set(None),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(|err| EngineError::from_write(err, "invitation"))
    }

    pub async fn get_invitation_by_code(&self, code: &str) -> ResultEngine<invitations::Model> {
        invitations::Entity::find()
            .filter(invitations::Column::Code.eq(code))
            .one(self.db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("invitation".to_string()))
    }

    /// Move an invitation to `status`, stamping the matching timestamp.
    pub async fn update_invitation(
        &self,
        params: UpdateInvitationParams,
    ) -> ResultEngine<invitations::Model> {
        let mut active = invitations::ActiveModel {
            id: ActiveValue::Unchanged(params.id),
            status: ActiveValue::Set(params.status),
            ..Default::default()
        };
        match params.status {
            InvitationStatus::Accepted => active.accepted_at = ActiveValue::Set(Some(params.at)),
            InvitationStatus::Rejected => active.rejected_at = ActiveValue::Set(Some(params.at)),
            InvitationStatus::Pending => {}
        }

        active
            .update(self.db)
            .await
            .map_err(|err| EngineError::from_write(err, "invitation"))
    }

    /// The most recent invitation of `invitee_id` into `group_id`.
    pub async fn get_current_invitation(
        &self,
        group_id: i64,
        invitee_id: i64,
    ) -> ResultEngine<invitations::Model> {
        invitations::Entity::find()
            .filter(invitations::Column::GroupId.eq(group_id))
            .filter(invitations::Column::InviteeId.eq(invitee_id))
            .order_by_desc(invitations::Column::Id)
            .one(self.db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("invitation".to_string()))
    }

    /// Reject every pending invitation of `invitee_id` into `group_id`.
    pub async fn reject_pending_invitations(
        &self,
        group_id: i64,
        invitee_id: i64,
        at: DateTime<Utc>,
    ) -> ResultEngine<u64> {
        let result = invitations::Entity::update_many()
            .col_expr(
                invitations::Column::Status,
                Expr::value(InvitationStatus::Rejected.as_str()),
            )
            .col_expr(invitations::Column::RejectedAt, Expr::value(at))
            .filter(invitations::Column::GroupId.eq(group_id))
            .filter(invitations::Column::InviteeId.eq(invitee_id))
            .filter(invitations::Column::Status.eq(InvitationStatus::Pending))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn delete_group_invitations(&self, group_id: i64) -> ResultEngine<u64> {
        let result = invitations::Entity::delete_many()
            .filter(invitations::Column::GroupId.eq(group_id))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn create_expense(
        &self,
        params: CreateExpenseParams,
    ) -> ResultEngine<expenses::Model> {
        expenses::ActiveModel {
            group_id: ActiveValue::Set(params.group_id),
            paid_by_id: ActiveValue::Set(params.paid_by_id),
            amount_cents: ActiveValue::Set(params.amount_cents),
            description: ActiveValue::Set(params.description),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(|err| EngineError::from_write(err, "expense"))
    }

    pub async fn get_expense(&self, id: i64) -> ResultEngine<expenses::Model> {
        expenses::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense".to_string()))
    }

    /// Expenses of a group, oldest first.
    pub async fn list_expenses(
        &self,
        group_id: i64,
        page: Page,
    ) -> ResultEngine<Vec<expenses::Model>> {
        expenses::Entity::find()
            .filter(expenses::Column::GroupId.eq(group_id))
            .order_by_asc(expenses::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(self.db)
            .await
            .map_err(Into::into)
    }

    pub async fn update_expense(
        &self,
        params: UpdateExpenseParams,
    ) -> ResultEngine<expenses::Model> {
        expenses::ActiveModel {
            id: ActiveValue::Unchanged(params.id),
            amount_cents: ActiveValue::Set(params.amount_cents),
            description: ActiveValue::Set(params.description),
            ..Default::default()
        }
        .update(self.db)
        .await
        .map_err(|err| EngineError::from_write(err, "expense"))
    }

    pub async fn delete_expense(&self, id: i64) -> ResultEngine<()> {
        let result = expenses::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("expense".to_string()));
        }
        Ok(())
    }

    pub async fn delete_group_expenses(&self, group_id: i64) -> ResultEngine<u64> {
        let result = expenses::Entity::delete_many()
            .filter(expenses::Column::GroupId.eq(group_id))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
