//! Tauri commands for persisting app-wide settings
//!
//! Settings live as a single JSON blob in the SQLite settings table so
//! the frontend does not need localStorage.

use crate::AppState;
use serde::{Deserialize, Serialize};
use sqlx;
use tauri::State;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Two-letter UI language tag ("ru" / "en"), None = follow profile
    pub default_language: Option<String>,
    pub reward_watcher_enabled: bool,
    /// Messages fetched per history page
    pub history_page_size: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_language: None,
            reward_watcher_enabled: true,
            history_page_size: 50,
        }
    }
}

/// Load app settings from the SQLite settings table
#[tauri::command]
pub async fn get_app_settings(state: State<'_, AppState>) -> Result<Option<AppSettings>, String> {
    let db_guard = state.db.read().await;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;

    let json = sqlx::query_scalar::<sqlx::Sqlite, String>(
        "SELECT value FROM settings WHERE key = 'app_settings'",
    )
    .fetch_optional(db.pool())
    .await
    .map_err(|e| e.to_string())?;

    match json {
        Some(j) => {
            let settings: AppSettings = serde_json::from_str(&j).map_err(|e| e.to_string())?;
            Ok(Some(settings))
        }
        None => Ok(None),
    }
}

/// Save app settings to the SQLite settings table
#[tauri::command]
pub async fn set_app_settings(
    state: State<'_, AppState>,
    settings: AppSettings,
) -> Result<(), String> {
    let db_guard = state.db.read().await;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;

    let json = serde_json::to_string(&settings).map_err(|e| e.to_string())?;

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES ('app_settings', ?)")
        .bind(&json)
        .execute(db.pool())
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}

/// Settings snapshot for other modules; falls back to defaults when
/// unset or unreadable
pub(crate) async fn load_app_settings(state: &AppState) -> AppSettings {
    let db_guard = state.db.read().await;
    let Some(db) = db_guard.as_ref() else {
        return AppSettings::default();
    };

    sqlx::query_scalar::<sqlx::Sqlite, String>(
        "SELECT value FROM settings WHERE key = 'app_settings'",
    )
    .fetch_optional(db.pool())
    .await
    .ok()
    .flatten()
    .and_then(|j| serde_json::from_str(&j).ok())
    .unwrap_or_default()
}

/// Storage stats returned to the frontend
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    pub data_dir: String,
    pub db_size_bytes: u64,
    pub profile_count: i64,
    pub archived_message_count: i64,
}

/// Get the local data directory path plus DB size
#[tauri::command]
pub async fn get_storage_info(state: State<'_, AppState>) -> Result<StorageInfo, String> {
    let data_dir = state.data_dir.to_string_lossy().to_string();

    let db_path = state.data_dir.join("fabula.db");
    let db_size_bytes = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let db_guard = state.db.read().await;
    let (profile_count, archived_message_count) = if let Some(db) = db_guard.as_ref() {
        let profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(db.pool())
            .await
            .unwrap_or(0);
        let messages: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(db.pool())
            .await
            .unwrap_or(0);
        (profiles, messages)
    } else {
        (0, 0)
    };

    Ok(StorageInfo {
        data_dir,
        db_size_bytes,
        profile_count,
        archived_message_count,
    })
}

/// Run VACUUM to compact the database file
#[tauri::command]
pub async fn vacuum_database(state: State<'_, AppState>) -> Result<(), String> {
    let db_guard = state.db.read().await;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;

    sqlx::query("VACUUM")
        .execute(db.pool())
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}
