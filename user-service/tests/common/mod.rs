use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::Authenticator;
use auth::HashingParams;
use auth::PasswordHasher;
use auth::TokenCodec;
use auth::TokenPair;
use auth::TokenWindows;
use axum::body::Body;
use axum::http::header;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use chrono::DateTime;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::json;
use serde_json::Value;
use tokio::sync::RwLock;
use tower::ServiceExt;
use user_service::domain::user::models::EmailAddress;
use user_service::domain::user::models::PhoneNumber;
use user_service::domain::user::models::User;
use user_service::domain::user::models::UserId;
use user_service::domain::user::models::UserPage;
use user_service::domain::user::ports::UserRepository;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::user::errors::UserError;

pub const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Store kept in memory, counting every call made against it.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
    calls: AtomicUsize,
}

impl InMemoryUserRepository {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        self.touch();
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.email == user.email || u.phone == user.phone)
        {
            return Err(UserError::DuplicateUser);
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        self.touch();
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        self.touch();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn count_by_email(&self, email: &EmailAddress) -> Result<u64, UserError> {
        self.touch();
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| &u.email == email)
            .count() as u64)
    }

    async fn count_by_phone(&self, phone: &PhoneNumber) -> Result<u64, UserError> {
        self.touch();
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| &u.phone == phone)
            .count() as u64)
    }

    async fn update_tokens(
        &self,
        id: &UserId,
        tokens: &TokenPair,
        updated_at: DateTime<Utc>,
    ) -> Result<(), UserError> {
        self.touch();
        let mut users = self.users.write().await;
        let user = users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        user.tokens = tokens.clone();
        user.updated_at = updated_at;
        Ok(())
    }

    async fn list_page(&self, offset: u64, limit: u64) -> Result<UserPage, UserError> {
        self.touch();
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });

        Ok(UserPage {
            total_count: all.len() as u64,
            users: all
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect(),
        })
    }
}

/// Application wired against the in-memory store, driven without a socket.
pub struct TestApp {
    pub router: Router,
    pub repository: Arc<InMemoryUserRepository>,
    pub authenticator: Arc<Authenticator>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn spawn() -> Self {
        let hasher = PasswordHasher::with_params(HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Invalid hashing params");
        let authenticator = Arc::new(Authenticator::with_parts(
            hasher,
            TokenCodec::new(SECRET),
            TokenWindows::default(),
        ));

        let repository = Arc::new(InMemoryUserRepository::default());
        let user_service = Arc::new(UserService::new(
            Arc::clone(&repository),
            Arc::clone(&authenticator),
            Duration::from_secs(5),
        ));

        Self {
            router: create_router(user_service, Arc::clone(&authenticator)),
            repository,
            authenticator,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse { status, body }
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::POST, path, None, Some(body)).await
    }

    pub async fn get_authenticated(&self, path: &str, token: &str) -> TestResponse {
        self.request(Method::GET, path, Some(token), None).await
    }

    /// Sign up a user and return its id.
    pub async fn signup(&self, email: &str, phone: &str, role: &str) -> String {
        let response = self.post("/users/signup", signup_body(email, phone, role)).await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["data"]["InsertedID"]
            .as_str()
            .expect("Missing InsertedID")
            .to_string()
    }

    /// Log in and return the access token.
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .post(
                "/users/login",
                json!({ "email": email, "password": "password123" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["data"]["token"]
            .as_str()
            .expect("Missing token")
            .to_string()
    }
}

pub fn signup_body(email: &str, phone: &str, role: &str) -> Value {
    json!({
        "email": email,
        "password": "password123",
        "phone": phone,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "role": role,
    })
}
