//! Chat Backend
//!
//! Abstraction over the remote conversation store, plus the HTTP client
//! that talks to the FastAPI service.

mod http;
mod traits;

pub use http::HttpBackend;
pub use traits::ChatBackend;
