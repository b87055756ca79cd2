//! HTTP API layer for crm-rs.
//!
//! - **Endpoints**: REST routers per entity.
//! - **Extractors**: bearer-token authentication.
//! - **Middleware**: token resolution, application state.
//!
//! Built on Axum 0.8 with a Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
