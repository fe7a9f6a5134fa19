use std::path::Path;

use tracing::{error, warn};

use crate::config::{RouteConfig, ServerConfig};
use crate::handlers;
use crate::http::{HttpRequest, HttpResponse};
use crate::listing::ListingError;

/// Longest route whose path is a whole-segment prefix of the request path.
pub fn find_route<'a>(path: &str, routes: &'a [RouteConfig]) -> Option<&'a RouteConfig> {
    routes
        .iter()
        .filter(|route| matches_prefix(path, &route.path))
        .max_by_key(|route| route.path.len())
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub fn route_request(request: &HttpRequest, config: &ServerConfig) -> HttpResponse {
    let path = request.decoded_path();

    let Some(route) = find_route(&path, &config.routes) else {
        return error_response(config, 404);
    };

    if !route.allows(&request.method) {
        return error_response(config, 405);
    }

    let relative = path
        .strip_prefix(route.path.trim_end_matches('/'))
        .unwrap_or("")
        .trim_start_matches('/');

    let result = if !relative.is_empty() {
        handlers::serve_static(route, relative)
    } else if route.autoindex {
        handlers::list_directory(route, request)
    } else if let Some(default_file) = &route.default_file {
        handlers::serve_static(route, default_file)
    } else {
        Err(ListingError::NotFound(route.root.clone()))
    };

    match result {
        Ok(response) => response,
        Err(err) => {
            let status = err.status_code();
            if status >= 500 {
                error!(path = %path, error = %err, "request failed");
            } else {
                warn!(path = %path, error = %err, "request rejected");
            }
            error_response(config, status)
        }
    }
}

/// Error page from `<error_path>/<status>.html`, or a one-line fallback.
pub fn error_response(config: &ServerConfig, status: u16) -> HttpResponse {
    let mut response = HttpResponse::from_status(status);
    response.set_header("Content-Type", "text/html; charset=utf-8");

    let page = Path::new(&config.error_path).join(format!("{}.html", status));
    match handlers::serve_file(&page) {
        Ok(content) if !config.error_path.is_empty() => response.set_body_bytes(content),
        _ => {
            let body = format!("<h1>{} - {}</h1>", response.status_code, response.status_text);
            response.set_body(&body);
        }
    }
    response
}
