//! High-level API wrappers for Fabula endpoints
//!
//! This module provides convenient wrappers around the raw HTTP client,
//! adding business logic like validation and reply cleanup.

mod chat;
mod quests;
mod rewards;
mod store;
mod user;

pub use chat::*;
pub use quests::*;
pub use rewards::*;
pub use store::*;
pub use user::*;
