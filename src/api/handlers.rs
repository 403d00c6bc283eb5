//! HTTP request handlers

use super::{assets, AppState};
use crate::connection::serve_websocket;
use axum::{
    extract::{ws::WebSocketUpgrade, Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

/// Create the HTTP router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Chat client
        .route("/", get(serve_index))
        .route("/assets/*path", get(serve_asset))
        // One conversation per socket
        .route("/ws", get(upgrade_websocket))
        .route("/health", get(health))
        .route("/version", get(version))
        .with_state(state)
}

async fn serve_index(State(state): State<AppState>) -> Response {
    assets::serve(state.static_dir.as_deref(), "index.html")
}

async fn serve_asset(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    assets::serve(state.static_dir.as_deref(), &path)
}

async fn upgrade_websocket(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let conversation = (state.scripts)();
        serve_websocket(socket, conversation, state.connection).await;
    })
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
