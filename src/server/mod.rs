//! On-demand serving mode
//!
//! Every API request runs the content pipeline from scratch, so edits to
//! the content directory show up without a rebuild. Anything outside
//! `/api` is served from the public directory.
//!
//! `/api/medium/followers` proxies the Medium follower count and answers
//! with an unknown count when the lookup fails.

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{ContentRepository, ContentType, RepositoryError};
use crate::generator::{EntryDocument, IndexDocument};
use crate::social::{medium_user, Followers, MediumClient};
use crate::Folio;

/// Server state
struct ServerState {
    folio: Folio,
    medium: MediumClient,
}

/// Start the server
pub async fn start(folio: &Folio, ip: &str, port: u16) -> Result<()> {
    let app = router(folio.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router
pub fn router(folio: Folio) -> Router {
    let public_dir = folio.public_dir.clone();
    let medium = MediumClient::new(&folio.config.social.medium_url);
    let state = Arc::new(ServerState { folio, medium });

    Router::new()
        .route("/api/medium/followers", get(medium_followers_handler))
        .route("/api/:kind", get(list_handler))
        .route("/api/:kind/:slug", get(entry_handler))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /api/{projects|blog}`
async fn list_handler(
    State(state): State<Arc<ServerState>>,
    Path(kind): Path<String>,
) -> Response {
    let Some(content_type) = parse_kind(&kind) else {
        return error_response(StatusCode::NOT_FOUND, format!("Unknown content type: {}", kind));
    };

    match load_repository(&state).await {
        Ok(repository) => {
            Json(IndexDocument::new(&repository, content_type, &state.folio)).into_response()
        }
        Err(response) => response,
    }
}

/// `GET /api/{projects|blog}/{slug}`
async fn entry_handler(
    State(state): State<Arc<ServerState>>,
    Path((kind, slug)): Path<(String, String)>,
) -> Response {
    let Some(content_type) = parse_kind(&kind) else {
        return error_response(StatusCode::NOT_FOUND, format!("Unknown content type: {}", kind));
    };

    let repository = match load_repository(&state).await {
        Ok(repository) => repository,
        Err(response) => return response,
    };

    match repository.get(content_type, &slug) {
        Ok(entry) => Json(EntryDocument::new(entry, &state.folio)).into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, e.to_string()),
    }
}

#[derive(Deserialize)]
struct FollowersQuery {
    user: Option<String>,
}

/// `GET /api/medium/followers[?user=name]`, defaulting to the Medium profile
async fn medium_followers_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<FollowersQuery>,
) -> Json<Followers> {
    let user = query
        .user
        .as_deref()
        .filter(|u| !u.is_empty())
        .or_else(|| medium_user(&state.folio.config));
    Json(state.medium.lookup(user).await)
}

fn parse_kind(kind: &str) -> Option<ContentType> {
    ContentType::ALL
        .into_iter()
        .find(|t| t.dir_name() == kind)
}

/// Run the pipeline off the async runtime
async fn load_repository(state: &Arc<ServerState>) -> Result<ContentRepository, Response> {
    let folio = state.folio.clone();
    let result = tokio::task::spawn_blocking(move || ContentRepository::load(&folio)).await;

    match result {
        Ok(Ok(repository)) => Ok(repository),
        Ok(Err(e @ RepositoryError::Io { .. })) => {
            tracing::error!("Content pipeline failed: {}", e);
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
        Ok(Err(e)) => Err(error_response(StatusCode::NOT_FOUND, e.to_string())),
        Err(e) => {
            tracing::error!("Content pipeline panicked: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Content pipeline failed".to_string(),
            ))
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
