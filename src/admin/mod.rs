//! Admin API.
//!
//! # Endpoints
//! - `GET /admin/status`: version and live snapshot summary
//! - `POST /admin/reload`: rebuild from the route file and publish
//! - `POST /admin/save`: write the live snapshot to the route file
//! - `GET /admin/route`: run a routing decision
//! - `GET /admin/dump`: render the live snapshot as a route file
//!
//! All endpoints require `Authorization: Bearer <api_key>`.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::codec::store::RouteStore;
use crate::config::schema::RoutingConfig;
use crate::routing::table::RouteTable;
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub table: Arc<RouteTable>,
    pub store: RouteStore,
    pub routing: RoutingConfig,
    pub api_key: Arc<str>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/reload", post(post_reload))
        .route("/admin/save", post(post_save))
        .route("/admin/route", get(get_route))
        .route("/admin/dump", get(get_dump))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the admin API until the shutdown signal fires.
pub async fn serve_admin(
    listener: TcpListener,
    state: AdminState,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
