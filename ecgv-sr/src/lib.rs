//! ecgv-sr library - Strip Renderer
//!
//! Turns a 12-lead ECG XML export into a PNG strip chart on standard ECG
//! paper and serves it over HTTP.

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;

use ecgv_common::{LayoutKind, TomlConfig};

pub mod api;
pub mod ecg;
pub mod error;

pub use ecg::Rasterizer;
pub use error::{Error, Result};

/// Render settings applied to every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub dpi: f32,
    /// Used when a request does not name a layout
    pub default_layout: LayoutKind,
}

impl RenderOptions {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            dpi: config.render.dpi,
            default_layout: config.render.default_layout,
        }
    }
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub render: RenderOptions,
    /// Holds the font database loaded at startup
    pub rasterizer: Rasterizer,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create new application state
    pub fn new(render: RenderOptions, rasterizer: Rasterizer, max_upload_bytes: usize) -> Self {
        Self {
            render,
            rasterizer,
            max_upload_bytes,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/upload_ecg", post(api::upload_ecg))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
