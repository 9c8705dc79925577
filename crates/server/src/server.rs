use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_extra::headers::{Authorization, Header, authorization::Bearer};
use chrono::Duration;

use std::sync::Arc;

use crate::{ServerError, categories, expenses, groups, invitations, members, users};
use engine::Engine;
use token::TokenMaker;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub tokens: Arc<TokenMaker>,
    /// Lifetime of the access tokens issued at login.
    pub access_token_duration: Duration,
}

impl ServerState {
    pub fn new(engine: Engine, tokens: TokenMaker, access_token_duration: Duration) -> Self {
        Self {
            engine: Arc::new(engine),
            tokens: Arc::new(tokens),
            access_token_duration,
        }
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Result<Authorization<Bearer>, ServerError> {
    let mut values = headers.get_all(AUTHORIZATION).iter().peekable();
    if values.peek().is_none() {
        return Err(ServerError::Unauthorized(
            "missing authorization header".to_string(),
        ));
    }
    Authorization::<Bearer>::decode(&mut values).map_err(|_| {
        ServerError::Unauthorized("unsupported authorization header".to_string())
    })
}

async fn auth(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let header = bearer_token(request.headers())?;
    let payload = state.tokens.verify_token(header.token())?;

    request.extensions_mut().insert(payload);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/users/me", get(users::me))
        .route(
            "/group_categories",
            get(categories::list).post(categories::create),
        )
        .route("/groups", get(groups::list).post(groups::create))
        .route(
            "/groups/{id}",
            get(groups::get).put(groups::update).delete(groups::delete),
        )
        .route(
            "/groups/{id}/members",
            get(members::list).post(members::invite),
        )
        .route("/groups/{id}/members/{member_id}", delete(members::remove))
        .route(
            "/groups/{id}/invitations/{invitee_id}",
            get(invitations::current),
        )
        .route(
            "/groups/{id}/expenses",
            get(expenses::list).post(expenses::create),
        )
        .route(
            "/groups/{id}/expenses/{expense_id}",
            get(expenses::get)
                .put(expenses::update)
                .delete(expenses::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/users", post(users::register))
        .route("/users/login", post(users::login))
        .route("/invitations/accept", post(invitations::accept))
        .route("/invitations/{code}", get(invitations::pending))
        .merge(protected)
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        for value in ["Bearer abc.def.ghi", "bearer abc.def.ghi", "BEARER abc.def.ghi"] {
            let header = bearer_token(&headers(value)).unwrap();
            assert_eq!(header.token(), "abc.def.ghi");
        }
    }

    #[test]
    fn missing_and_foreign_schemes_are_unauthorized() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(ServerError::Unauthorized(msg)) if msg.contains("missing")
        ));
        assert!(matches!(
            bearer_token(&headers("Basic YWxpY2U6cGFzcw==")),
            Err(ServerError::Unauthorized(_))
        ));
        assert!(matches!(
            bearer_token(&headers("Bearer")),
            Err(ServerError::Unauthorized(_))
        ));
    }
}
