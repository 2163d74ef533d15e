//! Thin web-application shell: a process launcher plus a cache-backed
//! status service.
//!
//! # Architecture Overview
//!
//! ```text
//!   appshell-launch (once, at process start)
//!   ┌────────────────────────────────────────────────┐
//!   │ config file ─┐                                 │
//!   │ argv ────────┼─▶ launcher ─▶ exec runtime ─────┼─▶ server process
//!   │ environment ─┘   (scan, memory plan, resolve)  │
//!   └────────────────────────────────────────────────┘
//!
//!   appshell (long-running, per request)
//!   ┌────────────────────────────────────────────────┐
//!   │ GET /        ─▶ static welcome page            │
//!   │ GET /status  ─▶ status::probe ─▶ cache client ─┼─▶ key-value store
//!   └────────────────────────────────────────────────┘
//! ```
//!
//! The two halves are independent; they compose only at the
//! process-startup boundary.

// Core subsystems
pub mod cache;
pub mod config;
pub mod http;
pub mod launcher;
pub mod status;

pub use cache::{CacheClient, CacheError};
pub use config::ServerConfig;
pub use http::HttpServer;
pub use launcher::{LaunchSettings, Launcher, LauncherError};
