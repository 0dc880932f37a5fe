//! Goals backend API
//!
//! HTTP client for goal creation, OAuth code relay, progress, and list lookup.

pub mod client;
pub mod error;
#[cfg(test)]
pub mod stub;
pub mod types;

pub use client::{ApiClient, GoalsApi, cache_busting_url};
pub use error::ApiError;
pub use types::{
    AuthUrlResponse, CallbackResponse, CreateGoalsResponse, ListSource, TodoLists, WeekProgress,
};
