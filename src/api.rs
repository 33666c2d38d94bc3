use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::PaginatedStatusResponse;
use crate::pagination::{paginate, PageRequest};
use crate::store::StatusStore;

/// Raw query strings; bad numbers fall back to defaults instead of a 400.
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    page: Option<String>,
    limit: Option<String>,
}

pub async fn get_status(
    State(store): State<StatusStore>,
    Query(query): Query<StatusQuery>,
) -> Json<PaginatedStatusResponse> {
    let request = PageRequest::from_raw(query.page.as_deref(), query.limit.as_deref());
    Json(paginate(store.get_all().await, request))
}

pub fn create_router(store: StatusStore) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

pub async fn start_server(port: u16, store: StatusStore) -> std::io::Result<()> {
    let app = create_router(store);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}
