use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::AppState;
use shared::{EditRequest, WallsResponse};

/// Health check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "online", "message": "Backend is ready" }))
}

/// Floor-plan image upload (multipart field `file`)
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, StatusCode> {
    let mut received = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Upload error: {}", e);
        StatusCode::BAD_REQUEST
    })? {
        if field.name() == Some("file") {
            let bytes = field.bytes().await.map_err(|e| {
                tracing::error!("Upload read error: {}", e);
                StatusCode::BAD_REQUEST
            })?;
            received = Some(bytes.len());
            break;
        }
    }

    let size = received.ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;
    tracing::info!("Processing upload ({} bytes)", size);

    // Пустой файл — стен нет
    if size == 0 {
        return Ok(Json(json!({ "walls": [] })));
    }

    let body = state
        .upload_response
        .as_deref()
        .cloned()
        .unwrap_or_else(|| json!({ "walls": [] }));
    Ok(Json(body))
}

/// Natural-language edit of the current walls
pub async fn edit(
    State(state): State<AppState>,
    Json(request): Json<EditRequest>,
) -> Result<Json<Value>, StatusCode> {
    tracing::info!(
        "Edit request '{}' over {} wall(s)",
        request.prompt,
        request.current_walls.len()
    );

    if let Some(body) = state.edit_response.as_deref() {
        return Ok(Json(body.clone()));
    }

    let echo = WallsResponse {
        walls: Some(request.current_walls),
    };
    serde_json::to_value(echo)
        .map(Json)
        .map_err(|e| {
            tracing::error!("Edit encode error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}
