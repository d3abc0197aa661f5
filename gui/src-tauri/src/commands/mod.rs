//! Tauri command handlers

pub mod agents;
pub mod auth;
pub mod cases;
pub mod chat;
pub mod daily;
pub mod onboarding;
pub mod quests;
pub mod settings;
pub mod store;

pub use agents::*;
pub use auth::*;
pub use cases::*;
pub use chat::*;
pub use daily::*;
pub use onboarding::*;
pub use quests::*;
pub use settings::*;
pub use store::*;

use crate::AppState;
use fabula_networking::FabulaClient;
use fabula_persistence::sqlite;

/// Build an API client for the active profile.
///
/// Looks up the active profile, decrypts its init-data token and wires
/// the shared case cache into the client. Returns the profile id so
/// callers can key local storage by it.
pub(crate) async fn active_client(state: &AppState) -> Result<(i64, FabulaClient), String> {
    let db_guard = state.db.read().await;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;

    let profile = sqlite::get_active_profile(db.pool())
        .await
        .map_err(|e| e.to_string())?
        .ok_or("No active profile")?;

    let encrypted = sqlite::get_profile_token(db.pool(), profile.id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("Profile token not found")?;

    let init_data = state
        .encryptor
        .decrypt(&encrypted)
        .map_err(|e| e.to_string())?;

    Ok((
        profile.id,
        FabulaClient::new_with_cache(&init_data, state.case_cache.clone()),
    ))
}
