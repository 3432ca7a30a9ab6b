use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::{
    ticket::{self, TicketError},
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct GenerateParams {
    /// Registration number of the student.
    pub reg_no: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "hallticket",
    responses((status = 200, description = "Health check", body = serde_json::Value))
)]
pub async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/generate",
    tag = "hallticket",
    params(GenerateParams),
    responses(
        (status = 200, description = "Hall ticket PDF", content_type = "application/pdf"),
        (status = 404, description = "Unknown registration number", body = serde_json::Value),
        (status = 500, description = "Internal error", body = serde_json::Value)
    )
)]
pub async fn generate(
    State(st): State<Arc<AppState>>,
    Query(params): Query<GenerateParams>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let reg_no = params.reg_no.trim().to_string();

    let pdf_path = ticket::generate_hall_ticket(&st.http, &st.config, &reg_no)
        .await
        .map_err(error_response)?;

    let bytes = tokio::fs::read(&pdf_path).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": format!("Server Error: {e}")})),
        )
    })?;

    // The generated file is ephemeral; nothing survives a successful response.
    if let Err(e) = tokio::fs::remove_file(&pdf_path).await {
        tracing::warn!("failed to remove generated pdf {}: {e}", pdf_path.display());
    }

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"hall_ticket_{reg_no}.pdf\""),
        ),
    ];
    Ok((headers, bytes))
}

fn error_response(err: TicketError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match err {
        TicketError::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({"detail": err.to_string()})))
}
