//! weekgoals - 12-week goal planning client
//!
//! Define a twelve-week plan (a named goal group whose goals each carry one
//! task per week), send it to the goals backend, and follow your progress.
//!
//! ## Features
//!
//! - **Goal editor:** draft goal groups in the terminal, validated before sending
//! - **Progress:** week-by-week summary computed by the backend
//! - **Task lists:** cached-token lookup with a manual OAuth code relay
//! - **Scripting:** `submit`, `progress`, `authorize`, and `lists` subcommands
//!
//! ## Quick Start
//!
//! ```bash
//! # Interactive mode
//! weekgoals
//!
//! # Send a draft written in TOML
//! weekgoals submit --file plan.toml
//!
//! # Progress since a given Monday
//! weekgoals progress --start-date 2025-07-14
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod goals;
pub mod logging;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use error::{ErrorCode, WeekGoalsError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
