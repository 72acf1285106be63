use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Request, State,
    },
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::warn;

use service::accounts::AccountService;
use service::auth::domain::{Identity, LoginInput, RegisterInput, RegistrationRole};
use service::auth::repo::seaorm::SeaOrmAccountRepository;
use service::auth::repository::AccountRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::memory::InMemoryStore;
use service::visits::repo::seaorm::SeaOrmVisitRequestRepository;
use service::visits::repository::VisitRequestRepository;
use service::visits::VisitService;
use service::Actor;

use crate::errors::JsonApiError;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService>,
    pub visits: Arc<VisitService>,
    pub accounts: Arc<AccountService>,
}

impl ServerState {
    pub fn new(accounts: Arc<dyn AccountRepository>, visits: Arc<dyn VisitRequestRepository>, cfg: AuthConfig) -> Self {
        Self {
            auth: Arc::new(AuthService::new(accounts.clone(), cfg)),
            visits: Arc::new(VisitService::new(visits)),
            accounts: Arc::new(AccountService::new(accounts)),
        }
    }

    pub fn with_database(db: DatabaseConnection, cfg: AuthConfig) -> Self {
        Self::new(
            Arc::new(SeaOrmAccountRepository::new(db.clone())),
            Arc::new(SeaOrmVisitRequestRepository::new(db)),
            cfg,
        )
    }

    /// Everything in process memory; nothing survives a restart.
    pub fn in_memory(cfg: AuthConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::new(store.clone(), store, cfg)
    }
}

/// Unwrap a JSON body, turning extractor rejections into the JSON error shape.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, JsonApiError> {
    payload.map(|Json(v)| v).map_err(|e| JsonApiError::bad_request(e.body_text()))
}

/// Unwrap a numeric path id; anything unparsable names no record.
pub(crate) fn path_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, JsonApiError> {
    path.map(|Path(id)| id)
        .map_err(|e| JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(e.body_text())))
}

#[derive(Serialize)]
pub struct RegisterOutput {
    pub user_id: i32,
    pub username: String,
    pub rol: &'static str,
}

#[derive(Serialize)]
pub struct LoginOutput {
    pub user_id: i32,
    pub username: String,
    pub rol: &'static str,
    pub token: String,
}

#[derive(Serialize)]
pub struct MeOutput {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
    pub rol: &'static str,
    pub cliente_id: Option<i32>,
    pub jardinero_id: Option<i32>,
}

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered"), (status = 400, description = "Validation Error"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterOutput>), JsonApiError> {
    let input = json_body(payload)?;
    let identity = state.auth.register(input).await?;
    let rol = if identity.gardener_id.is_some() { RegistrationRole::Gardener } else { RegistrationRole::Client };
    let out = RegisterOutput { user_id: identity.account.id, username: identity.account.username, rol: rol.as_tag() };
    Ok((StatusCode::CREATED, Json(out)))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let input = json_body(payload)?;
    let session = state.auth.login(input).await?;
    let Some(token) = session.token else {
        return Err(JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Token Error", Some("token generation failed".into())));
    };
    let mut cookie = Cookie::new(AUTH_COOKIE, token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    let jar = jar.add(cookie);
    let identity = session.identity;
    let out = LoginOutput {
        user_id: identity.account.id,
        rol: Actor::resolve(&identity).role_name(),
        username: identity.account.username,
        token,
    };
    Ok((jar, Json(out)))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 204, description = "Cookie cleared")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/auth/me", tag = "auth", responses((status = 200, description = "Current account"), (status = 401, description = "Unauthorized")))]
pub async fn me(Extension(identity): Extension<Identity>, Extension(actor): Extension<Actor>) -> Json<MeOutput> {
    let a = identity.account;
    Json(MeOutput {
        id: a.id,
        username: a.username,
        first_name: a.first_name,
        last_name: a.last_name,
        email: a.email,
        is_staff: a.is_staff,
        rol: actor.role_name(),
        cliente_id: identity.client_id,
        jardinero_id: identity.gardener_id,
    })
}

fn cookie_token(req: &Request) -> Option<String> {
    CookieJar::from_headers(req.headers())
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Middleware for protected routes: `Authorization: Bearer <token>`, falling
/// back to the `auth_token` cookie. Missing token is 400, invalid or expired
/// is 401. On success the resolved [`Identity`] and [`Actor`] are inserted as
/// request extensions.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    let authz = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    let token = match authz {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(t) => t.trim().to_string(),
            None => {
                warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(JsonApiError::unauthorized("expected a Bearer token"));
            }
        },
        None => match cookie_token(&req) {
            Some(t) => t,
            None => {
                warn!(path = %path, "missing Authorization header and auth_token cookie");
                return Err(JsonApiError::bad_request("authentication token missing"));
            }
        },
    };

    let identity = state.auth.identify(&token).await.map_err(|e| {
        warn!(path = %path, err = %e, "token validation failed");
        JsonApiError::from(e)
    })?;
    let actor = Actor::resolve(&identity);
    req.extensions_mut().insert(actor);
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
