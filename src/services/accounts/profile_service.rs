use crate::{
    auth::{hash_password, user, verify_password},
    entities::{
        profile, profile_avatar,
        profile_avatar::{DEFAULT_AVATAR_ALT, DEFAULT_AVATAR_SRC},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        commerce::product_cards::ImageView,
        media::{avatar_path, fit_avatar, MediaStorage},
    },
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::validate_email;

pub static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?1?\d{11}$").expect("phone pattern compiles"));

pub const FULL_NAME_MAX: usize = 150;
pub const PASSWORD_MIN: usize = 5;
pub const PASSWORD_MAX: usize = 128;

/// Profile, avatar and password management for signed-in users
#[derive(Clone)]
pub struct ProfileService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    media: MediaStorage,
}

impl ProfileService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>, media: MediaStorage) -> Self {
        Self {
            db,
            event_sender,
            media,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: i32) -> Result<ProfileView, ServiceError> {
        let user = find_user(&*self.db, user_id).await?;
        let profile = ensure_profile(&*self.db, &user).await?;
        let avatar = ensure_avatar(&*self.db, &profile).await?;
        Ok(self.view(&user, profile, avatar))
    }

    /// Applies the fields present in `input`; an empty phone clears it.
    #[instrument(skip(self, input))]
    pub async fn update_profile(
        &self,
        user_id: i32,
        input: UpdateProfileInput,
    ) -> Result<ProfileView, ServiceError> {
        let mut user = find_user(&*self.db, user_id).await?;
        let profile = ensure_profile(&*self.db, &user).await?;

        let full_name = match input.full_name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.chars().count() > FULL_NAME_MAX {
                    return Err(ServiceError::ValidationError(format!(
                        "fullName is longer than {} characters",
                        FULL_NAME_MAX
                    )));
                }
                Some(name)
            }
            None => None,
        };

        let phone = match input.phone {
            Some(raw) => Some(self.checked_phone(&raw, profile.id).await?),
            None => None,
        };

        let email = match input.email {
            Some(email) => {
                let email = email.trim().to_string();
                if !email.is_empty() && !validate_email(&email) {
                    return Err(ServiceError::ValidationError(format!(
                        "'{}' is not a valid email address",
                        email
                    )));
                }
                Some(email)
            }
            None => None,
        };

        let txn = self.db.begin().await?;
        if let Some(email) = email.filter(|e| *e != user.email) {
            let mut active: user::ActiveModel = user.into();
            active.email = Set(email);
            user = active.update(&txn).await?;
        }

        let mut active: profile::ActiveModel = profile.into();
        if let Some(name) = full_name {
            active.full_name = Set(name);
        }
        if let Some(phone) = phone {
            active.phone = Set(phone);
        }
        let profile = active.update(&txn).await?;
        txn.commit().await?;

        let avatar = ensure_avatar(&*self.db, &profile).await?;

        self.event_sender
            .send_or_log(Event::ProfileUpdated(profile.id))
            .await;
        info!(profile_id = profile.id, "Profile updated");
        Ok(self.view(&user, profile, avatar))
    }

    /// Normalises an uploaded picture, stores it and points the profile at
    /// it. The previous file is removed only once the row has moved on.
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn upload_avatar(
        &self,
        user_id: i32,
        filename: &str,
        bytes: &[u8],
    ) -> Result<ImageView, ServiceError> {
        if bytes.is_empty() {
            return Err(ServiceError::BadRequest("avatar file is empty".to_string()));
        }
        let raw = bytes.to_vec();
        let processed = tokio::task::spawn_blocking(move || fit_avatar(&raw))
            .await
            .map_err(|e| ServiceError::InternalError(format!("avatar processing failed: {}", e)))??;

        let user = find_user(&*self.db, user_id).await?;
        let profile = ensure_profile(&*self.db, &user).await?;
        let avatar = ensure_avatar(&*self.db, &profile).await?;

        let src = avatar_path(profile.id, filename);
        let previous = avatar.src.clone();
        let replaces_own_file = !avatar.is_default() && previous != src;
        self.media.save(&src, &processed).await?;

        let mut active: profile_avatar::ActiveModel = avatar.into();
        active.src = Set(src.clone());
        let avatar = match active.update(&*self.db).await {
            Ok(avatar) => avatar,
            Err(e) => {
                if previous != src {
                    if let Err(cleanup) = self.media.remove(&src).await {
                        warn!("Could not remove orphaned avatar {}: {}", src, cleanup);
                    }
                }
                return Err(e.into());
            }
        };

        if replaces_own_file {
            if let Err(e) = self.media.remove(&previous).await {
                warn!("Could not remove previous avatar {}: {}", previous, e);
            }
        }

        self.event_sender
            .send_or_log(Event::AvatarUploaded {
                profile_id: profile.id,
                src,
            })
            .await;

        Ok(ImageView {
            src: self.media.url(&avatar.src),
            alt: avatar.alt,
        })
    }

    /// Rejections surface as server errors, matching the storefront forms.
    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let length = new_password.chars().count();
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
            return Err(ServiceError::FormRejected(format!(
                "new password must be {} to {} characters",
                PASSWORD_MIN, PASSWORD_MAX
            )));
        }

        let user = find_user(&*self.db, user_id).await?;
        if !verify_password(current_password, &user.password_hash) {
            return Err(ServiceError::FormRejected(
                "current password is incorrect".to_string(),
            ));
        }

        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(hash_password(new_password)?);
        active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::PasswordChanged(user_id))
            .await;
        info!(user_id, "Password changed");
        Ok(())
    }

    async fn checked_phone(
        &self,
        raw: &str,
        profile_id: i32,
    ) -> Result<Option<String>, ServiceError> {
        let phone = raw.trim();
        if phone.is_empty() {
            return Ok(None);
        }
        if !PHONE_RE.is_match(phone) {
            return Err(ServiceError::ValidationError(
                "phone must look like +1XXXXXXXXXXX".to_string(),
            ));
        }
        let taken = profile::Entity::find()
            .filter(profile::Column::Phone.eq(phone))
            .filter(profile::Column::Id.ne(profile_id))
            .one(&*self.db)
            .await?
            .is_some();
        if taken {
            return Err(ServiceError::ValidationError(
                "phone is already in use".to_string(),
            ));
        }
        Ok(Some(phone.to_string()))
    }

    fn view(
        &self,
        user: &user::Model,
        profile: profile::Model,
        avatar: profile_avatar::Model,
    ) -> ProfileView {
        ProfileView {
            full_name: profile.full_name,
            email: user.email.clone(),
            phone: profile.phone,
            avatar: ImageView {
                src: self.media.url(&avatar.src),
                alt: avatar.alt,
            },
        }
    }
}

pub(crate) async fn find_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<user::Model, ServiceError> {
    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("user", user_id))
}

/// Profile for `user`, created from the account name when missing
pub(crate) async fn ensure_profile<C: ConnectionTrait>(
    db: &C,
    user: &user::Model,
) -> Result<profile::Model, ServiceError> {
    if let Some(existing) = profile::Entity::find()
        .filter(profile::Column::UserId.eq(user.id))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    Ok(profile::ActiveModel {
        user_id: Set(user.id),
        full_name: Set(user.first_name.clone()),
        phone: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Avatar row for `profile`, pointing at the shared default image when new
pub(crate) async fn ensure_avatar<C: ConnectionTrait>(
    db: &C,
    profile: &profile::Model,
) -> Result<profile_avatar::Model, ServiceError> {
    if let Some(existing) = profile_avatar::Entity::find()
        .filter(profile_avatar::Column::ProfileId.eq(profile.id))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    Ok(profile_avatar::ActiveModel {
        profile_id: Set(profile.id),
        src: Set(DEFAULT_AVATAR_SRC.to_string()),
        alt: Set(DEFAULT_AVATAR_ALT.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar: ImageView,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}
