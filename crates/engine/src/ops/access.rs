use sea_orm::ConnectionTrait;

use crate::{EngineError, ResultEngine, groups, queries::Queries};

/// Load a group and check `user_id` created it.
pub(super) async fn require_group_owner<C: ConnectionTrait>(
    queries: &Queries<'_, C>,
    group_id: i64,
    user_id: i64,
) -> ResultEngine<groups::Model> {
    let group = queries.get_group(group_id).await?;
    if group.created_by_id != user_id {
        return Err(EngineError::Forbidden(
            "only the group owner can do this".to_string(),
        ));
    }
    Ok(group)
}

/// Load a group and check `user_id` belongs to it.
pub(super) async fn require_group_member<C: ConnectionTrait>(
    queries: &Queries<'_, C>,
    group_id: i64,
    user_id: i64,
) -> ResultEngine<groups::Model> {
    let group = queries.get_group(group_id).await?;
    match queries.get_group_member(group_id, user_id).await {
        Ok(_) => Ok(group),
        Err(EngineError::KeyNotFound(_)) => Err(EngineError::Forbidden(
            "not a member of this group".to_string(),
        )),
        Err(err) => Err(err),
    }
}
