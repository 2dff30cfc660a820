use auth::policy;
use auth::Role;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::ProfileData;
use crate::domain::user::models::PageRequest;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn list_users<UR: UserRepository>(
    State(state): State<AppState<UR>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Query(query): Query<ListUsersQuery>,
) -> Result<ApiSuccess<ListUsersResponseData>, ApiError> {
    policy::require_role(&caller.claims, Role::Admin).map_err(|e| {
        tracing::warn!(caller = %caller.claims.sub, role = %caller.claims.role, "Access denied");
        ApiError::from(e)
    })?;

    let page = PageRequest::from_query(
        query.record_per_page.as_deref(),
        query.page.as_deref(),
        query.start_index.as_deref(),
    );

    state
        .user_service
        .list_users(page)
        .await
        .map_err(ApiError::from)
        .map(|page| {
            ApiSuccess::new(
                StatusCode::OK,
                ListUsersResponseData {
                    total_count: page.total_count,
                    user_items: page.users.iter().map(ProfileData::from).collect(),
                },
            )
        })
}

/// Raw pagination parameters. Kept as strings so bad values fall back to
/// defaults instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    #[serde(rename = "recordPerPage")]
    record_per_page: Option<String>,
    page: Option<String>,
    #[serde(rename = "startIndex")]
    start_index: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListUsersResponseData {
    pub total_count: u64,
    pub user_items: Vec<ProfileData>,
}
