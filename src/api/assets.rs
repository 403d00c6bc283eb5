//! Embedded static assets
//!
//! An optional filesystem directory takes precedence, so the client can be
//! edited without rebuilding.

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;
use std::path::{Component, Path, PathBuf};

#[derive(Embed)]
#[folder = "ui"]
struct Assets;

/// Look up `path` in `static_dir` first, then in the embedded assets.
pub fn load(static_dir: Option<&Path>, path: &str) -> Option<Vec<u8>> {
    let relative = sanitize(path)?;

    if let Some(dir) = static_dir {
        let fs_path = dir.join(&relative);
        if fs_path.is_file() {
            match std::fs::read(&fs_path) {
                Ok(content) => return Some(content),
                Err(e) => {
                    tracing::warn!(path = %fs_path.display(), error = %e, "Failed to read static file");
                }
            }
        }
    }

    Assets::get(&relative.to_string_lossy()).map(|content| content.data.into_owned())
}

/// Serve a static file with a guessed content type
pub fn serve(static_dir: Option<&Path>, path: &str) -> Response {
    match load(static_dir, path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                Body::from(content),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Reject anything that could escape the asset root
fn sanitize(path: &str) -> Option<PathBuf> {
    let path = Path::new(path.trim_start_matches('/'));
    if path.as_os_str().is_empty() {
        return None;
    }
    path.components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| path.to_path_buf())
}
