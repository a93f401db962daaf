//! Route handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{AuthError, Claims};
use crate::http::server::AppState;

/// Body of `POST /auth/register`. Absent fields are reported as 400.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "API is running",
        "auth_endpoints": ["/auth/register", "/auth/login"],
    }))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response, AuthError> {
    let session = state
        .auth
        .register(&body.name, &body.email, &body.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "token": session.token,
            "user": session.user,
        })),
    )
        .into_response())
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    let outcome = state.auth.login(&body.email, &body.password).await?;
    Ok(outcome.into_response())
}

/// Current user, resolved from the verified token.
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Response, AuthError> {
    let id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
    let user = state
        .auth
        .store()
        .get(id)
        .await?
        .ok_or(AuthError::UserNotFound)?;
    Ok(Json(json!({ "user": user.public(), "expires_at": claims.exp })).into_response())
}
