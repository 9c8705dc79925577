//! Conversions from engine records to response bodies.

use api_types::{
    Pagination,
    category::CategoryView,
    expense::ExpenseView,
    group::GroupView,
    invitation::{InvitationStatus, InvitationView},
    member::MembershipView,
    user::UserView,
};
use engine::{Page, categories, expenses, group_members, groups, invitations, users};

const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 200;

/// Clamp query-string pagination into an engine page.
pub(crate) fn page(pagination: Pagination) -> Page {
    Page {
        limit: pagination
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE),
        offset: pagination.offset.unwrap_or(0),
    }
}

pub(crate) fn user(model: users::Model) -> UserView {
    UserView {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        phone: model.phone,
        image_path: model.image_path,
        time_zone: model.time_zone,
        created_at: model.created_at,
    }
}

pub(crate) fn category(model: categories::Model) -> CategoryView {
    CategoryView {
        id: model.id,
        name: model.name,
    }
}

pub(crate) fn group(model: groups::Model) -> GroupView {
    GroupView {
        id: model.id,
        name: model.name,
        category_id: model.category_id,
        image_path: model.image_path,
        created_by_id: model.created_by_id,
        created_at: model.created_at,
    }
}

pub(crate) fn membership(model: group_members::Model) -> MembershipView {
    MembershipView {
        id: model.id,
        group_id: model.group_id,
        user_id: model.user_id,
        created_at: model.created_at,
    }
}

pub(crate) fn invitation(model: invitations::Model) -> InvitationView {
    InvitationView {
        id: model.id,
        inviter_id: model.inviter_id,
        invitee_id: model.invitee_id,
        group_id: model.group_id,
        status: match model.status {
            engine::InvitationStatus::Pending => InvitationStatus::Pending,
            engine::InvitationStatus::Accepted => InvitationStatus::Accepted,
            engine::InvitationStatus::Rejected => InvitationStatus::Rejected,
        },
        created_at: model.created_at,
        accepted_at: model.accepted_at,
        rejected_at: model.rejected_at,
    }
}

pub(crate) fn expense(model: expenses::Model) -> ExpenseView {
    ExpenseView {
        id: model.id,
        group_id: model.group_id,
        paid_by_id: model.paid_by_id,
        amount_cents: model.amount_cents,
        description: model.description,
        created_at: model.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_clamps() {
        assert_eq!(
            page(Pagination::default()),
            Page {
                limit: DEFAULT_PAGE_SIZE,
                offset: 0
            }
        );
        let huge = Pagination {
            limit: Some(10_000),
            offset: Some(20),
        };
        assert_eq!(
            page(huge),
            Page {
                limit: MAX_PAGE_SIZE,
                offset: 20
            }
        );
        let zero = Pagination {
            limit: Some(0),
            offset: None,
        };
        assert_eq!(page(zero).limit, 1);
    }
}
