use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use tower_http::cors::CorsLayer;

use itinerary_core::{ItineraryError, ItineraryStore, report};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl From<ItineraryError> for AppError {
    fn from(err: ItineraryError) -> Self {
        let status = match &err {
            e if e.is_client_error() => StatusCode::UNPROCESSABLE_ENTITY,
            ItineraryError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, "{}", self.message);
        }
        let body = serde_json::json!({ "error": self.message, "code": self.code });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(store: ItineraryStore) -> Router {
    Router::new()
        .route("/api/itinerary", get(get_itinerary).post(save_itinerary))
        .route("/api/export", get(export_report))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(store))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(store: ItineraryStore, bind: &str, port: u16) -> Result<()> {
    tracing::info!(path = %store.path().display(), "serving itinerary file");
    let app = build_router(store);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("itinerary serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("itinerary serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_itinerary(State(store): State<Arc<ItineraryStore>>) -> impl IntoResponse {
    Json(store.load())
}

// The body is taken as text so schema errors carry the offending JSON path.
async fn save_itinerary(
    State(store): State<Arc<ItineraryStore>>,
    body: String,
) -> Result<axum::response::Response, AppError> {
    tracing::info!("saving itinerary");
    store.save_json(&body)?;
    let body = serde_json::json!({ "status": "success", "message": "Saved" });
    Ok(Json(body).into_response())
}

async fn export_report(
    State(store): State<Arc<ItineraryStore>>,
) -> Result<axum::response::Response, AppError> {
    let report = report::export(&store)?;
    let disposition = format!("attachment; filename={}", report.filename);
    Ok((
        [
            (header::CONTENT_TYPE, report.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.bytes,
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
