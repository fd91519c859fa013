use crate::{
    auth::{hash_password, user, verify_password, AuthService, TokenPair},
    errors::ServiceError,
    events::{Event, EventSender},
    services::accounts::profile_service::{ensure_avatar, ensure_profile, PASSWORD_MAX, PASSWORD_MIN},
};
use chrono::Utc;
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]{1,150}$").expect("username pattern compiles"));

/// Registration and session handling.
///
/// Every rejected sign-in or sign-up comes back as
/// [`ServiceError::FormRejected`], which the storefront renders as a 500.
#[derive(Clone)]
pub struct AccountService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    auth: Arc<AuthService>,
}

impl AccountService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        auth: Arc<AuthService>,
    ) -> Self {
        Self {
            db,
            event_sender,
            auth,
        }
    }

    /// Creates the account with its profile and default avatar, then signs in
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn sign_up(&self, input: SignUpInput) -> Result<TokenPair, ServiceError> {
        let username = input.username.trim().to_string();
        if !USERNAME_RE.is_match(&username) {
            return Err(ServiceError::FormRejected(
                "username may only contain letters, digits and @/./+/-/_".to_string(),
            ));
        }
        check_password_length(&input.password)?;

        let txn = self.db.begin().await?;

        let taken = user::Entity::find()
            .filter(user::Column::Username.eq(username.as_str()))
            .one(&txn)
            .await?
            .is_some();
        if taken {
            return Err(ServiceError::FormRejected(format!(
                "username '{}' is already taken",
                username
            )));
        }

        let user = user::ActiveModel {
            username: Set(username),
            first_name: Set(input.name.trim().to_string()),
            email: Set(String::new()),
            password_hash: Set(hash_password(&input.password)?),
            is_staff: Set(false),
            is_active: Set(true),
            date_joined: Set(Utc::now()),
            last_login: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let profile = ensure_profile(&txn, &user).await?;
        ensure_avatar(&txn, &profile).await?;

        txn.commit().await?;

        counter!("shop.accounts.registered", 1);
        self.event_sender
            .send_or_log(Event::UserRegistered {
                user_id: user.id,
                profile_id: profile.id,
            })
            .await;
        info!(user_id = user.id, "Registered user {}", user.username);

        Ok(self.auth.generate_token(&user)?)
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<TokenPair, ServiceError> {
        let user = user::Entity::find()
            .filter(user::Column::Username.eq(username.trim()))
            .one(&*self.db)
            .await?;

        let user = match user {
            Some(user) if user.is_active && verify_password(password, &user.password_hash) => user,
            _ => {
                warn!("Rejected sign-in for {}", username);
                counter!("shop.auth.sign_in_failures", 1);
                return Err(ServiceError::FormRejected(
                    "invalid username or password".to_string(),
                ));
            }
        };

        let token = self.auth.generate_token(&user)?;

        let user_id = user.id;
        let mut active: user::ActiveModel = user.into();
        active.last_login = Set(Some(Utc::now()));
        active.update(&*self.db).await?;

        counter!("shop.auth.sign_ins", 1);
        self.event_sender
            .send_or_log(Event::UserSignedIn(user_id))
            .await;
        Ok(token)
    }

    /// Revokes the presented token; missing or already invalid tokens are fine.
    #[instrument(skip(self, token))]
    pub async fn sign_out(&self, token: Option<&str>) {
        let Some(token) = token else {
            return;
        };
        let user_id = self
            .auth
            .validate_token(token)
            .await
            .ok()
            .and_then(|claims| claims.sub.parse::<i32>().ok());

        if let Err(e) = self.auth.revoke_token(token).await {
            info!("Sign-out with unusable token: {}", e);
            return;
        }
        if let Some(user_id) = user_id {
            self.event_sender
                .send_or_log(Event::UserSignedOut(user_id))
                .await;
        }
    }
}

fn check_password_length(password: &str) -> Result<(), ServiceError> {
    let length = password.chars().count();
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
        return Err(ServiceError::FormRejected(format!(
            "password must be {} to {} characters",
            PASSWORD_MIN, PASSWORD_MAX
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpInput {
    pub name: String,
    pub username: String,
    pub password: String,
}
