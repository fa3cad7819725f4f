//! Roster Server - HTTP user directory over roster-engine.
//!
//! The directory lives entirely in memory. Every handler works against a
//! shared [`EntityStore`] of [`User`]s; restarting the process starts over.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;

use crate::config::Config;
use axum::Router;
use roster_engine::{EntityStore, Role, User};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<EntityStore<User>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            store: Arc::new(EntityStore::new()),
            config: Arc::new(config),
        }
    }
}

/// Build the router with tracing and permissive CORS.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

/// Populate an empty directory with a few users to browse.
pub fn seed_demo_users(store: &EntityStore<User>) {
    if !store.is_empty() {
        return;
    }

    let demo = [
        ("Alice Johnson", "alice@example.com", Role::Admin),
        ("Bob Smith", "bob@example.com", Role::Editor),
        ("Carol White", "carol@example.com", Role::Viewer),
        ("Dave Brown", "dave@example.com", Role::Editor),
        ("Eve Davis", "eve@example.com", Role::Viewer),
    ];
    for (name, email, role) in demo {
        store.create(User::new(name, email, role));
    }
    tracing::info!(count = demo.len(), "seeded demo users");
}
