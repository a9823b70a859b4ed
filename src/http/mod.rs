//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, span, peer address)
//!     → handlers.rs (classify the request)
//!     → response.rs / pages.rs (HTML or JSON)
//!     → Send to client
//! ```

pub mod handlers;
pub mod pages;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
