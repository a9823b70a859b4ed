//! CloudFront caller-info service library.

pub mod classifier;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use classifier::{classify, AccessDecision, CallerInfo, ClassifierPolicy, Denial};
pub use config::schema::AppConfig;
pub use error::AppError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
