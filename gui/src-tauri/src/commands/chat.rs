//! Chat commands: sending messages and paging through history

use crate::AppState;
use fabula_core::{ChatMessage, ChatStatus, SendMessageResponse};
use fabula_networking::api;
use fabula_persistence::sqlite;
use serde::Serialize;
use tauri::State;
use tracing::{debug, info, warn};

const DEFAULT_PAGE_SIZE: u32 = 50;

/// Snapshot of the in-memory chat log sent to the frontend
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    pub messages: Vec<ChatMessage>,
    /// True once all server-side history has been fetched
    pub exhausted: bool,
}

/// Whether the active profile can currently send a message
#[tauri::command]
pub async fn get_chat_status(state: State<'_, AppState>) -> Result<ChatStatus, String> {
    let (_, client) = super::active_client(&state).await?;

    client.get_chat_status().await.map_err(|e| e.to_string())
}

/// Send a chat message to the story agent
///
/// Rejects a second send while one is still in flight, so double-Enter
/// does not burn energy twice.
#[tauri::command]
pub async fn send_message(
    text: String,
    state: State<'_, AppState>,
) -> Result<SendMessageResponse, String> {
    let _guard = state
        .pending
        .begin("send_message")
        .map_err(|e| e.to_string())?;

    let (profile_id, client) = super::active_client(&state).await?;

    let sent = api::send_chat_message(&client, &text)
        .await
        .map_err(|e| e.to_string())?;

    // Keep the in-memory log and the local archive in step with the server
    {
        let mut log = state.chat_log.lock().await;
        log.push_live(sent.user_message.clone());
        log.push_live(sent.reply.clone());
    }
    archive(&state, profile_id, &[sent.user_message.clone(), sent.reply.clone()]).await;

    info!("Message sent, energy left: {}", sent.energy);
    Ok(sent)
}

/// Load one page of older history into the in-memory log
///
/// Returns the full log snapshot so the frontend can re-render in one
/// pass. Newly fetched messages are archived locally.
#[tauri::command]
pub async fn load_history(
    limit: Option<u32>,
    state: State<'_, AppState>,
) -> Result<ChatView, String> {
    let (profile_id, client) = super::active_client(&state).await?;
    let limit = match limit {
        Some(limit) => limit,
        None => super::settings::load_app_settings(&state).await.history_page_size,
    };

    let mut log = state.chat_log.lock().await;
    let added = api::load_older_messages(&client, &mut log, limit)
        .await
        .map_err(|e| e.to_string())?;

    if added > 0 {
        // merge_page prepends older messages, so the new ones are the
        // first `added` entries
        let fresh: Vec<ChatMessage> = log.messages()[..added].to_vec();
        archive(&state, profile_id, &fresh).await;
    }

    debug!("History page merged: {} new messages", added);

    Ok(ChatView {
        messages: log.messages().to_vec(),
        exhausted: log.is_exhausted(),
    })
}

/// Load the newest archived messages without touching the network
///
/// Used to show something immediately on startup while the first
/// history page is still loading.
#[tauri::command]
pub async fn get_archived_messages(
    limit: Option<u32>,
    state: State<'_, AppState>,
) -> Result<Vec<ChatMessage>, String> {
    let db_guard = state.db.read().await;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;

    let profile = sqlite::get_active_profile(db.pool())
        .await
        .map_err(|e| e.to_string())?
        .ok_or("No active profile")?;

    sqlite::load_recent_messages(db.pool(), profile.id, limit.unwrap_or(DEFAULT_PAGE_SIZE))
        .await
        .map_err(|e| e.to_string())
}

/// Delete the local chat archive for the active profile
#[tauri::command]
pub async fn clear_chat_archive(state: State<'_, AppState>) -> Result<u64, String> {
    let db_guard = state.db.read().await;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;

    let profile = sqlite::get_active_profile(db.pool())
        .await
        .map_err(|e| e.to_string())?
        .ok_or("No active profile")?;

    let removed = sqlite::clear_messages(db.pool(), profile.id)
        .await
        .map_err(|e| e.to_string())?;

    info!("Cleared {} archived messages", removed);
    Ok(removed)
}

/// Archive failures must not fail the user-facing operation
async fn archive(state: &AppState, profile_id: i64, messages: &[ChatMessage]) {
    let db_guard = state.db.read().await;
    let Some(db) = db_guard.as_ref() else { return };

    if let Err(e) = sqlite::archive_messages(db.pool(), profile_id, messages).await {
        warn!("Failed to archive {} messages: {}", messages.len(), e);
    }
}
