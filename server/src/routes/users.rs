//! User directory routes.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use roster_engine::{Page, RecordId};

use crate::error::Result;
use crate::handlers::{
    handle_create, handle_delete, handle_get, handle_list, handle_stats, handle_update,
    CreateUserRequest, ListQuery, StatsResponse, UpdateUserRequest, UserView,
};
use crate::AppState;

type QueryResult<T> = std::result::Result<Query<T>, QueryRejection>;
type JsonResult<T> = std::result::Result<Json<T>, JsonRejection>;
type IdResult = std::result::Result<Path<RecordId>, PathRejection>;

/// Create user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/stats", get(user_stats))
        .route(
            "/api/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

/// GET /api/users - Filtered, sorted page of users.
async fn list_users(
    State(state): State<AppState>,
    query: QueryResult<ListQuery>,
) -> Result<Json<Page<UserView>>> {
    let Query(query) = query?;
    let page = handle_list(&state.store, query, state.config.default_page_size)?;
    Ok(Json(page))
}

/// GET /api/users/stats - Totals by role.
async fn user_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(handle_stats(&state.store))
}

/// GET /api/users/{id}
async fn get_user(
    State(state): State<AppState>,
    id: IdResult,
) -> Result<Json<UserView>> {
    let Path(id) = id?;
    Ok(Json(handle_get(&state.store, id)?))
}

/// POST /api/users
async fn create_user(
    State(state): State<AppState>,
    body: JsonResult<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserView>)> {
    let Json(request) = body?;
    let view = handle_create(&state.store, request)?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// PATCH /api/users/{id}
async fn update_user(
    State(state): State<AppState>,
    id: IdResult,
    body: JsonResult<UpdateUserRequest>,
) -> Result<Json<UserView>> {
    let Path(id) = id?;
    let Json(request) = body?;
    Ok(Json(handle_update(&state.store, id, request)?))
}

/// DELETE /api/users/{id}
async fn delete_user(
    State(state): State<AppState>,
    id: IdResult,
) -> Result<StatusCode> {
    let Path(id) = id?;
    handle_delete(&state.store, id)?;
    Ok(StatusCode::NO_CONTENT)
}
