use crate::api::errors::ApiError;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Assets;

pub async fn asset(Path(path): Path<String>) -> Result<Response, ApiError> {
    let Some(file) = Assets::get(&path) else {
        return Err(ApiError::new(StatusCode::NOT_FOUND, "not_found", "asset not found"));
    };
    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, mime.as_ref().to_string())], file.data.into_owned()).into_response())
}
