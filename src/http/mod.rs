//! HTTP surface of the status service.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, timeout + trace layers)
//!     → GET /        static welcome page
//!     → GET /status  status::probe through the cache client
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
