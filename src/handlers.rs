use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, HeaderName, Method, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::AppState;

/// Largest request body the dev proxy buffers before forwarding.
const MAX_PROXY_BODY: usize = 16 * 1024 * 1024;

// --- Handlers ---

/// proxy_api
///
/// Forwards `/api/v1/...` to the configured backend, rewriting the prefix to
/// the backend's API path. Method, headers, query and body pass through; the
/// `Host` header is dropped so the backend sees its own origin.
///
/// The backend's status, headers and body come back unchanged, errors
/// included. A transport failure answers 502; an oversized body 413.
pub async fn proxy_api(State(state): State<AppState>, request: Request) -> Response {
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let url = state.proxy.rewrite(&path_and_query);

    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_PROXY_BODY).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
    };

    let mut headers = parts.headers;
    headers.remove(header::HOST);
    strip_hop_headers(&mut headers);

    tracing::debug!(method = %parts.method, %url, "proxying API request");

    let upstream = match state
        .http
        .request(parts.method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(%url, error = %e, "backend unreachable");
            return (StatusCode::BAD_GATEWAY, "backend unreachable").into_response();
        }
    };

    let status = upstream.status();
    let mut upstream_headers = upstream.headers().clone();
    strip_hop_headers(&mut upstream_headers);

    match upstream.bytes().await {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            *response.headers_mut() = upstream_headers;
            response
        }
        Err(e) => {
            tracing::error!(%url, error = %e, "backend response could not be read");
            (StatusCode::BAD_GATEWAY, "backend response could not be read").into_response()
        }
    }
}

/// spa_fallback
///
/// History-mode fallback for every path that is not the API or `/health`.
///
/// - Redirect routes (`/`) answer 307 with the resolved path.
/// - Known views are served the application shell, `index.html`; the client
///   then runs the route guard with the session it holds.
/// - Anything else is a 404.
pub async fn spa_fallback(State(state): State<AppState>, request: Request) -> Response {
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let path = request.uri().path().to_string();
    let Some(resolved) = state.routes.resolve(&path) else {
        return (StatusCode::NOT_FOUND, "Page not found.").into_response();
    };

    if resolved.redirected {
        let location = match request.uri().query() {
            Some(query) => format!("{}?{}", resolved.path, query),
            None => resolved.path.to_string(),
        };
        return Redirect::temporary(&location).into_response();
    }

    let index = state.config.static_dir.join("index.html");
    if !index.is_file() {
        tracing::warn!(path = %index.display(), "application shell missing");
        return (StatusCode::NOT_FOUND, "Application shell not built.").into_response();
    }

    match ServeFile::new(index).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

// Hop-by-hop headers describe one connection and must not cross the proxy.
// Headers listed in `Connection` are hop-by-hop as well.
fn strip_hop_headers(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in listed {
        headers.remove(name);
    }

    for name in [
        header::CONNECTION,
        HeaderName::from_static("keep-alive"),
        header::PROXY_AUTHENTICATE,
        header::PROXY_AUTHORIZATION,
        header::TE,
        header::TRAILER,
        header::TRANSFER_ENCODING,
        header::UPGRADE,
        header::CONTENT_LENGTH,
    ] {
        headers.remove(name);
    }
}
