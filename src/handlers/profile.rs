use crate::{
    auth::{AuthRouterExt, AuthUser},
    errors::ApiError,
    handlers::common::{map_service_error, parse_form_body, success_response, validate_input},
    services::{
        accounts::{ProfileView, UpdateProfileInput},
        commerce::ImageView,
    },
    AppState,
};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Json, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

pub const AVATAR_FIELD: &str = "avatar";

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(max = 150))]
    pub full_name: Option<String>,
    #[validate(length(max = 254))]
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 5, max = 128))]
    pub new_password: String,
}

pub fn profile_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(get_profile).post(update_profile).patch(update_profile),
        )
        .route(
            "/profile/avatar",
            post(upload_avatar).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/profile/password", post(change_password))
        .with_auth()
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileView),
        (status = 401, description = "Not signed in", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Profile"
)]
pub async fn get_profile(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let profile = state
        .services
        .profiles
        .get_profile(user.user_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(profile))
}

/// Partially update the profile
#[utoipa::path(
    post,
    path = "/api/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileView),
        (status = 400, description = "Invalid phone or email", body = crate::errors::ErrorResponse),
        (status = 401, description = "Not signed in", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Profile"
)]
pub async fn update_profile(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let profile = state
        .services
        .profiles
        .update_profile(
            user.user_id,
            UpdateProfileInput {
                full_name: payload.full_name,
                email: payload.email,
                phone: payload.phone,
            },
        )
        .await
        .map_err(map_service_error)?;
    Ok(success_response(profile))
}

/// Upload a new avatar as multipart field `avatar`
///
/// The picture is fitted into a 291x291 white square and stored as JPEG.
#[utoipa::path(
    post,
    path = "/api/profile/avatar",
    responses(
        (status = 200, description = "Stored avatar", body = ImageView),
        (status = 400, description = "Missing, untyped or unreadable image", body = crate::errors::ErrorResponse),
        (status = 401, description = "Not signed in", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Profile"
)]
pub async fn upload_avatar(
    user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed upload: {}", e)))?
    {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }

        let is_image = field
            .content_type()
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false);
        if !is_image {
            return Err(ApiError::BadRequest("avatar must be an image".to_string()));
        }

        let filename = field.file_name().unwrap_or(AVATAR_FIELD).to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("could not read upload: {}", e)))?;

        let avatar = state
            .services
            .profiles
            .upload_avatar(user.user_id, &filename, &bytes)
            .await
            .map_err(map_service_error)?;
        return Ok(success_response(avatar));
    }

    Err(ApiError::BadRequest(format!(
        "multipart field '{}' is required",
        AVATAR_FIELD
    )))
}

/// Change the password
#[utoipa::path(
    post,
    path = "/api/profile/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 500, description = "Wrong current password or invalid new one", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Profile"
)]
pub async fn change_password(
    user: AuthUser,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let form: ChangePasswordRequest = parse_form_body(&body)?;

    state
        .services
        .profiles
        .change_password(user.user_id, &form.current_password, &form.new_password)
        .await
        .map_err(map_service_error)?;

    Ok(StatusCode::OK.into_response())
}
