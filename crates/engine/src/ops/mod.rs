use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine, queries::Queries};

mod access;
mod categories;
mod expenses;
mod groups;
mod invitations;
mod users;

pub use expenses::RecordExpenseParams;
pub use groups::{GroupCreated, GroupDeleted, MemberRemoved};
pub use invitations::{AcceptInvitationParams, InvitationAccepted, InviteUserParams, UserInvited};
pub use users::RegisterUserParams;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug)]
pub struct Engine {
    pub(crate) database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Single-row operations against the pool, outside any workflow.
    pub fn queries(&self) -> Queries<'_, DatabaseConnection> {
        Queries::new(&self.database)
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn validate_password(password: &str) -> ResultEngine<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(EngineError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_names_are_trimmed() {
        assert_eq!(
            normalize_required_name("  Ski Trip ", "group name").unwrap(),
            "Ski Trip"
        );
        assert_eq!(
            normalize_required_name("   ", "group name").unwrap_err(),
            EngineError::InvalidInput("group name must not be empty".to_string())
        );
    }

    #[test]
    fn blank_optional_text_is_none() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(
            normalize_optional_text(Some(" a@b.c ")),
            Some("a@b.c".to_string())
        );
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }
}
