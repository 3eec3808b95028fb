//! HTTP API handlers for ecgv-sr

pub mod buildinfo;
pub mod error;
pub mod health;
pub mod ui;
pub mod upload;

pub use buildinfo::get_build_info;
pub use error::{ApiError, ApiResult};
pub use health::health_routes;
pub use ui::{serve_app_js, serve_index};
pub use upload::upload_ecg;
