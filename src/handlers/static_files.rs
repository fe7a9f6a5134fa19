use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::RouteConfig;
use crate::http::HttpResponse;
use crate::listing::{ListingError, PathState};

/// Serve a file from disk
pub fn serve_file(file_path: &Path) -> Result<Vec<u8>, ListingError> {
    if !file_path.is_file() {
        return Err(ListingError::NotFound(file_path.to_path_buf()));
    }
    fs::read(file_path).map_err(|e| ListingError::io(file_path, e))
}

/// Serve `relative` (already stripped of the route prefix) from the route root.
pub fn serve_static(route: &RouteConfig, relative: &str) -> Result<HttpResponse, ListingError> {
    let path = PathState::resolve(Some(relative)).confine(&route.root)?;

    if path.is_dir() {
        warn!(path = %path.display(), "static request for a directory");
        return Err(ListingError::NotFound(path));
    }

    let content = serve_file(&path)?;
    debug!(path = %path.display(), bytes = content.len(), "serving file");

    let mut response = HttpResponse::ok();
    response.set_header("Content-Type", content_type(&path));
    response.set_body_bytes(content);
    Ok(response)
}

pub fn content_type(file_path: &Path) -> &'static str {
    let ext = file_path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
