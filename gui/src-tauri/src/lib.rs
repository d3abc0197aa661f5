//! Fabula GUI - Tauri application library

pub mod commands;
pub mod reward_watcher;
mod state;

pub use reward_watcher::RewardWatcherHandle;
pub use state::{AppState, PendingActions, PendingGuard};
