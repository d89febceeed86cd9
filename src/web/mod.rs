//! HTTP layer for LMS.
//!
//! A thin axum adapter: handlers bind requests, call the account and loan
//! services, and map `LmsError` to status codes.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
