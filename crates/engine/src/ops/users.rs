use crate::{
    EngineError, ResultEngine,
    credentials::{hash_password, verify_password},
    queries::CreateUserParams,
    users,
};

use super::{Engine, normalize_optional_text, normalize_required_name, validate_password};

#[derive(Clone, Debug)]
pub struct RegisterUserParams {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub image_path: String,
    pub time_zone: String,
}

impl Engine {
    /// Sign up a new user. Email (and phone, when given) must be unused.
    pub async fn register_user(&self, params: RegisterUserParams) -> ResultEngine<users::Model> {
        let first_name = normalize_required_name(&params.first_name, "first name")?;
        let email = normalize_required_name(&params.email, "email")?;
        if !email.contains('@') {
            return Err(EngineError::InvalidInput(format!(
                "\"{email}\" is not an email address"
            )));
        }
        validate_password(&params.password)?;

        let user = self
            .queries()
            .create_user(CreateUserParams {
                first_name,
                last_name: params.last_name.trim().to_string(),
                email: Some(email),
                phone: normalize_optional_text(params.phone.as_deref()),
                password_hash: hash_password(&params.password),
                image_path: params.image_path.trim().to_string(),
                time_zone: params.time_zone,
            })
            .await?;
        tracing::info!(user_id = user.id, "user registered");
        Ok(user)
    }

    /// Check an email/password pair. Unknown emails and wrong passwords fail
    /// the same way.
    pub async fn login(&self, email: &str, password: &str) -> ResultEngine<users::Model> {
        let user = match self.queries().get_user_by_email(email.trim()).await {
            Ok(user) => user,
            Err(EngineError::KeyNotFound(_)) => return Err(EngineError::InvalidCredentials),
            Err(err) => return Err(err),
        };
        if !verify_password(password, &user.password_hash) {
            return Err(EngineError::InvalidCredentials);
        }
        Ok(user)
    }

    pub async fn user(&self, id: i64) -> ResultEngine<users::Model> {
        self.queries().get_user(id).await
    }
}
