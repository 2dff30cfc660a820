use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::get_user::get_user;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::signup::signup;
use super::middleware::authenticate as auth_middleware;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::service::UserService;

pub struct AppState<UR>
where
    UR: UserRepository,
{
    pub user_service: Arc<UserService<UR>>,
}

impl<UR> Clone for AppState<UR>
where
    UR: UserRepository,
{
    fn clone(&self) -> Self {
        Self {
            user_service: Arc::clone(&self.user_service),
        }
    }
}

pub fn create_router<UR>(
    user_service: Arc<UserService<UR>>,
    authenticator: Arc<Authenticator>,
) -> Router
where
    UR: UserRepository,
{
    let state = AppState { user_service };

    let public_routes = Router::new()
        .route("/users/signup", post(signup::<UR>))
        .route("/users/login", post(login::<UR>));

    let protected_routes = Router::new()
        .route("/users", get(list_users::<UR>))
        .route("/users/:user_id", get(get_user::<UR>))
        .route_layer(middleware::from_fn_with_state(
            authenticator,
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
