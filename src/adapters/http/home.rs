use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};

const INDEX_HTML: &str = include_str!("../../../assets/index.html");
const APP_JS: &str = include_str!("../../../assets/app.js");

/// `GET /` — single-page UI, embedded at compile time.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `GET /static/app.js`
pub async fn app_js() -> impl IntoResponse {
    ([(CONTENT_TYPE, "application/javascript")], APP_JS)
}

/// `GET /favicon.ico` — no icon is shipped; keep browsers quiet.
pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}
