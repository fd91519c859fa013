#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

use megano_api::{
    auth::{self, user, UserModel},
    config::AppConfig,
    db,
    entities::commerce::{
        category, product, product_image, product_tag, review, sale, tag, CategoryModel,
        ProductModel, SaleModel, TagModel,
    },
    events::{self, EventSender},
    AppState,
};

/// Application router over a fresh in-memory SQLite database and a
/// temporary media root.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub media_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Builds the app after letting the caller tweak the configuration
    pub async fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let media_dir = tempfile::tempdir().expect("temp media dir");

        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "megano_integration_test_secret_that_is_comfortably_longer_than_64_chars".to_string(),
            "127.0.0.1".to_string(),
            18_000,
            "test".to_string(),
        );
        cfg.media_root = media_dir.path().to_path_buf();
        tweak(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("in-memory database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, EventSender::new(event_tx));
        let router = megano_api::build_router(state.clone());

        Self {
            router,
            state,
            media_dir,
            _event_task: event_task,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).expect("request"))
            .await
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None, None).await
    }

    /// POSTs a single-part multipart form carrying one file field
    pub async fn upload(
        &self,
        uri: &str,
        token: &str,
        field: &str,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Response {
        let boundary = "megano-boundary";
        let request = Request::post(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(multipart_body(
                boundary,
                field,
                filename,
                content_type,
                data,
            )))
            .expect("multipart request");
        self.send(request).await
    }

    // ---- seeding ------------------------------------------------------

    pub async fn user(&self, username: &str, is_staff: bool) -> UserModel {
        user::ActiveModel {
            username: Set(username.to_string()),
            first_name: Set(username.to_string()),
            email: Set(String::new()),
            password_hash: Set(auth::hash_password("secret-pass").expect("hash")),
            is_staff: Set(is_staff),
            is_active: Set(true),
            date_joined: Set(Utc::now()),
            last_login: Set(None),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("insert user")
    }

    /// Seeds a customer and returns it with a valid access token
    pub async fn customer(&self, username: &str) -> (UserModel, String) {
        let user = self.user(username, false).await;
        let token = self.token_for(&user);
        (user, token)
    }

    pub async fn staff(&self, username: &str) -> (UserModel, String) {
        let user = self.user(username, true).await;
        let token = self.token_for(&user);
        (user, token)
    }

    pub fn token_for(&self, user: &UserModel) -> String {
        self.state
            .auth
            .generate_token(user)
            .expect("token")
            .access_token
    }

    pub async fn category(&self, title: &str, parent: Option<i32>) -> CategoryModel {
        category::ActiveModel {
            title: Set(title.to_string()),
            slug: Set(title.to_lowercase().replace(' ', "-")),
            parent_id: Set(parent),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("insert category")
    }

    pub async fn product(&self, seed: ProductSeed) -> ProductModel {
        product::ActiveModel {
            title: Set(seed.title),
            price: Set(seed.price),
            count: Set(seed.count),
            date: Set(seed.date),
            description: Set(format!("{} description", seed.category_id)),
            full_description: Set(String::new()),
            archived: Set(seed.archived),
            free_delivery: Set(seed.free_delivery),
            limited_edition: Set(seed.limited_edition),
            category_id: Set(seed.category_id),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("insert product")
    }

    pub async fn image(&self, product_id: i32, src: &str) {
        product_image::ActiveModel {
            product_id: Set(product_id),
            src: Set(src.to_string()),
            alt: Set("image".to_string()),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("insert image");
    }

    pub async fn review(&self, product_id: i32, user_id: i32, rate: i16) {
        review::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(product_id),
            author: Set("Reviewer".to_string()),
            email: Set("reviewer@example.com".to_string()),
            text: Set("Fine".to_string()),
            rate: Set(rate),
            date: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("insert review");
    }

    pub async fn tag(&self, name: &str) -> TagModel {
        tag::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("insert tag")
    }

    pub async fn tag_product(&self, product_id: i32, tag_id: i32) {
        product_tag::ActiveModel {
            product_id: Set(product_id),
            tag_id: Set(tag_id),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("insert product tag");
    }

    pub async fn sale(
        &self,
        product_id: i32,
        sale_price: Decimal,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
    ) -> SaleModel {
        sale::ActiveModel {
            product_id: Set(product_id),
            sale_price: Set(sale_price),
            date_from: Set(date_from),
            date_to: Set(date_to),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("insert sale")
    }
}

/// Product row with sensible defaults; override what the test cares about
#[derive(Debug, Clone)]
pub struct ProductSeed {
    pub title: String,
    pub price: Decimal,
    pub count: i32,
    pub date: DateTime<Utc>,
    pub archived: bool,
    pub free_delivery: bool,
    pub limited_edition: bool,
    pub category_id: i32,
}

impl ProductSeed {
    pub fn new(title: &str, category_id: i32, price: Decimal) -> Self {
        Self {
            title: title.to_string(),
            price,
            count: 10,
            date: Utc::now() - Duration::days(1),
            archived: false,
            free_delivery: false,
            limited_edition: false,
            category_id,
        }
    }

    pub fn count(mut self, count: i32) -> Self {
        self.count = count;
        self
    }

    pub fn days_old(mut self, days: i64) -> Self {
        self.date = Utc::now() - Duration::days(days);
        self
    }

    pub fn archived(mut self) -> Self {
        self.archived = true;
        self
    }

    pub fn free_delivery(mut self) -> Self {
        self.free_delivery = true;
        self
    }

    pub fn limited(mut self) -> Self {
        self.limited_edition = true;
        self
    }
}

/// Single-part multipart body; an empty `content_type` leaves the header out.
pub fn multipart_body(
    boundary: &str,
    field: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    if !content_type.is_empty() {
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Ids of the `items` array of a catalog-shaped response
pub fn ids(items: &Value) -> Vec<i64> {
    items
        .as_array()
        .expect("array")
        .iter()
        .map(|item| item["id"].as_i64().expect("id"))
        .collect()
}
