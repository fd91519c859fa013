use crate::{
    auth::{cleared_session_cookie, session_cookie, token_from_headers, TokenPair},
    errors::ApiError,
    handlers::common::{map_service_error, parse_form_body},
    services::accounts::SignUpInput,
    AppState,
};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

/// Sign-in form
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignInRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Sign-up form
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignUpRequest {
    #[serde(default)]
    #[validate(length(max = 150))]
    pub name: String,
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(length(min = 5, max = 128))]
    pub password: String,
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-in", post(sign_in))
        .route("/sign-up", post(sign_up))
        .route("/sign-out", post(sign_out))
}

fn signed_in(token: TokenPair) -> Response {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&token))],
        Json(token),
    )
        .into_response()
}

/// Sign in with username and password
#[utoipa::path(
    post,
    path = "/api/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in; the token is also set as a cookie", body = TokenPair),
        (status = 500, description = "Malformed form or bad credentials", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn sign_in(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let form: SignInRequest = parse_form_body(&body)?;

    let token = state
        .services
        .accounts
        .sign_in(&form.username, &form.password)
        .await
        .map_err(map_service_error)?;

    info!("User {} signed in", form.username);
    Ok(signed_in(token))
}

/// Register a new account and sign it in
#[utoipa::path(
    post,
    path = "/api/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "Account created and signed in", body = TokenPair),
        (status = 500, description = "Malformed form or username taken", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn sign_up(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let form: SignUpRequest = parse_form_body(&body)?;

    let token = state
        .services
        .accounts
        .sign_up(SignUpInput {
            name: form.name,
            username: form.username,
            password: form.password,
        })
        .await
        .map_err(map_service_error)?;

    Ok(signed_in(token))
}

/// Revoke the current token and clear the session cookie
#[utoipa::path(
    post,
    path = "/api/sign-out",
    responses((status = 200, description = "Signed out")),
    tag = "Auth"
)]
pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = token_from_headers(&headers);
    state.services.accounts.sign_out(token.as_deref()).await;
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cleared_session_cookie())],
    )
        .into_response()
}
