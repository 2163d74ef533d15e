//! Process launcher subsystem.
//!
//! Runs once at process start: turns CLI arguments, environment variables
//! and an optional operator config file into a fully-formed runtime
//! command, then hands control to it.
//!
//! # Data Flow
//! ```text
//! Scan (args.rs):
//!     config file tokens ++ argv → LaunchConfig
//!
//! Plan (memory.rs):
//!     -mem + caller flags + probed version → MemoryPlan
//!
//! Assemble + exec (command.rs):
//!     LaunchConfig + LaunchSettings + env → LaunchCommand → exec/spawn
//! ```
//!
//! # Design Decisions
//! - Fail fast: every launcher error is fatal, exit non-zero
//! - Single-threaded and synchronous; the only blocking call is the
//!   final hand-off to the child process

pub mod args;
pub mod command;
pub mod error;
pub mod memory;
pub mod runtime;

pub use args::{LaunchConfig, Parsed, DEFAULT_MEMORY_MB};
pub use command::{Launch, LaunchCommand, LaunchSettings, Launcher};
pub use error::{LauncherError, ValueKind};
pub use memory::{MemoryPlan, RuntimeVersion};
