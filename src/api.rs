use crate::bookmarklet;
use crate::routing::{self, RouteDecision};
use crate::server::AppState;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

pub async fn serve_app_script(State(state): State<AppState>) -> impl IntoResponse {
    match std::fs::read_to_string(state.config.asset_root.join("app.js")) {
        Ok(script) => {
            let mut resp = Response::new(script);
            resp.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/javascript; charset=utf-8"),
            );
            resp
        }
        Err(_) => {
            let script = crate::sdk::app_script();
            let mut resp = Response::new(script);
            resp.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/javascript; charset=utf-8"),
            );
            resp
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BookmarkletQuery {
    #[serde(default)]
    pub email: String,
    /// Host the page read from its own metadata; overrides request-derived
    /// host so the bookmarklet matches the page that asked for it.
    pub host: Option<String>,
}

pub async fn get_bookmarklet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BookmarkletQuery>,
) -> impl IntoResponse {
    let request_host = super::server::host_from_headers(&headers);
    let host = query
        .host
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| state.config.host_for_request(request_host.as_deref()));
    let t = bookmarklet::now_ms();
    let uri = bookmarklet::build(&host, &query.email, t);
    tracing::debug!(%host, t, "built bookmarklet");
    Json(json!({ "bookmarklet": uri, "t": t }))
}

pub async fn serve_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> impl IntoResponse {
    let request_host = super::server::host_from_headers(&headers);
    match routing::resolve_route(
        &state.config,
        uri.path(),
        request_host.as_deref(),
        state.pages.as_ref(),
    )
    .await
    {
        Ok(RouteDecision::Serve(html)) => Html(html).into_response(),
        Ok(RouteDecision::Redirect(target)) => {
            (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, target)]).into_response()
        }
        Ok(RouteDecision::NotFound) => (StatusCode::NOT_FOUND, "Not Found").into_response(),
        Err(err) => {
            tracing::error!(?err, path = uri.path(), "page render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
