use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/uploads", post(upload))
        .route("/uploads/{file}", get(serve))
}

/// Store an uploaded image under a unique name and hand back the URL a
/// post can reference.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(AppError::BadRequest(
                "Only image files can be uploaded.".to_string(),
            ));
        }

        let original = field.file_name().unwrap_or("upload").to_string();
        let safe: String = original
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let stored = format!("{}_{}", uuid::Uuid::now_v7(), safe);

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let dir = state.config.uploads_path();
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(dir.join(&stored), &data).await?;

        tracing::info!("Stored upload {} ({} bytes)", stored, data.len());
        return Ok(Json(serde_json::json!({ "url": format!("/uploads/{}", stored) }))
            .into_response());
    }

    Err(AppError::BadRequest("No file field in upload.".to_string()))
}

pub async fn serve(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> AppResult<Response> {
    // The route matches a single segment, but stay strict about names.
    if file.contains("..") || file.contains('/') || file.contains('\\') {
        return Err(AppError::NotFound("File not found".to_string()));
    }

    let path = state.config.uploads_path().join(&file);
    match tokio::fs::read(&path).await {
        Ok(data) => {
            let mime = mime_guess::from_path(&file).first_or_octet_stream();
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                data,
            )
                .into_response())
        }
        Err(_) => Err(AppError::NotFound("File not found".to_string())),
    }
}
