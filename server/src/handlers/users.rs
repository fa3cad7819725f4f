//! User directory handlers - translate requests into store operations.

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use roster_engine::{
    EntityStore, Filter, Page, PageRequest, Record, RecordId, Role, SortKey, SortOrder, Timestamp,
    User,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A user as rendered on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Record<User>> for UserView {
    fn from(record: Record<User>) -> Self {
        let id = record.id();
        let version = record.version();
        let created_at = to_datetime(record.created_at());
        let updated_at = to_datetime(record.updated_at());
        let user = record.into_payload();

        Self {
            id,
            name: user.name,
            email: user.email,
            role: user.role,
            version,
            created_at,
            updated_at,
        }
    }
}

fn to_datetime(millis: Timestamp) -> DateTime<Utc> {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}

/// Query parameters for listing users.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Exact role match, case-insensitive
    pub role: Option<String>,
    /// Case-insensitive substring of the name
    pub q: Option<String>,
    /// Sort key name (defaults to `id`)
    pub sort: Option<String>,
    /// `asc` or `desc`
    pub order: Option<SortOrder>,
    /// Zero-based page index
    pub page: Option<i64>,
    /// Page size, 1 to 100
    pub size: Option<i64>,
}

/// Body for creating a user.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Viewer
}

/// Body for a partial update. Absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// Directory-wide counts.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total: usize,
    pub by_role: BTreeMap<String, usize>,
}

/// List users matching the query, one page at a time.
pub fn handle_list(
    store: &EntityStore<User>,
    query: ListQuery,
    default_page_size: i64,
) -> Result<Page<UserView>> {
    let role = query
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let request = PageRequest::new(
        query.page.unwrap_or(0),
        query.size.unwrap_or(default_page_size),
    )?;

    let filter = Filter::new()
        .eq_opt("role", role)
        .contains_opt("name", query.q.filter(|q| !q.is_empty()));
    let sort = SortKey::by(query.sort.unwrap_or_else(|| "id".to_string()))
        .with_order(query.order.unwrap_or_default());

    let page = store.paginate(&filter, &sort, request);
    tracing::debug!(
        matching = page.total_matching,
        page = page.page_index,
        "listed users"
    );
    Ok(page.map(UserView::from))
}

/// Fetch one user.
pub fn handle_get(store: &EntityStore<User>, id: RecordId) -> Result<UserView> {
    store
        .get_by_id(id)
        .map(UserView::from)
        .ok_or(AppError::NotFound(id))
}

/// Create a user after checking the submitted fields.
pub fn handle_create(store: &EntityStore<User>, request: CreateUserRequest) -> Result<UserView> {
    validate_name(&request.name)?;
    validate_email(&request.email)?;

    let record = store.create(User::new(
        request.name.trim(),
        request.email.trim(),
        request.role,
    ));
    tracing::info!(id = record.id(), role = %record.payload().role, "user created");
    Ok(record.into())
}

/// Apply a partial update.
pub fn handle_update(
    store: &EntityStore<User>,
    id: RecordId,
    request: UpdateUserRequest,
) -> Result<UserView> {
    if let Some(name) = &request.name {
        validate_name(name)?;
    }
    if let Some(email) = &request.email {
        validate_email(email)?;
    }

    store
        .update_and_get(id, |user| {
            if let Some(name) = request.name {
                user.name = name.trim().to_string();
            }
            if let Some(email) = request.email {
                user.email = email.trim().to_string();
            }
            if let Some(role) = request.role {
                user.role = role;
            }
        })
        .map(UserView::from)
        .ok_or(AppError::NotFound(id))
}

/// Remove a user.
pub fn handle_delete(store: &EntityStore<User>, id: RecordId) -> Result<()> {
    if store.delete(id) {
        tracing::info!(id, "user deleted");
        Ok(())
    } else {
        Err(AppError::NotFound(id))
    }
}

/// Count users, broken down by role. Every role appears, even at zero.
pub fn handle_stats(store: &EntityStore<User>) -> StatsResponse {
    let counts = store.count_by_key(|user| user.role);
    let by_role = [Role::Admin, Role::Editor, Role::Viewer]
        .into_iter()
        .map(|role| {
            let count = counts.get(&role).copied().unwrap_or(0);
            (role.as_str().to_string(), count)
        })
        .collect();

    StatsResponse {
        total: store.len(),
        by_role,
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    if !email.contains('@') {
        return Err(AppError::BadRequest(format!("invalid email: {}", email)));
    }
    Ok(())
}
