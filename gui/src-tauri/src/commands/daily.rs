//! Daily reward commands and reward watcher controls

use crate::reward_watcher::{save_reward_watcher_enabled, RewardWatcherHandle};
use crate::AppState;
use fabula_core::{DailyRewardClaim, DailyRewardInfo, DailyRewardStatus};
use serde::Serialize;
use tauri::{Manager, State};
use tracing::info;

/// Claims unlock daily
const CLAIM_INTERVAL_SECS: i64 = 24 * 60 * 60;

/// Check claim eligibility for the active profile
#[tauri::command]
pub async fn get_daily_reward_status(
    state: State<'_, AppState>,
) -> Result<DailyRewardStatus, String> {
    let (_, client) = super::active_client(&state).await?;

    client.check_daily_reward().await.map_err(|e| e.to_string())
}

/// The streak ladder (star amounts per day of the cycle)
#[tauri::command]
pub async fn get_daily_reward_ladder(
    state: State<'_, AppState>,
) -> Result<DailyRewardInfo, String> {
    let (_, client) = super::active_client(&state).await?;

    client.get_daily_reward().await.map_err(|e| e.to_string())
}

/// Claim the daily reward for the active profile
#[tauri::command]
pub async fn claim_daily_reward(
    app_handle: tauri::AppHandle,
    state: State<'_, AppState>,
) -> Result<DailyRewardClaim, String> {
    let _guard = state
        .pending
        .begin("claim_daily_reward")
        .map_err(|e| e.to_string())?;

    let (profile_id, client) = super::active_client(&state).await?;

    let claim = client
        .claim_daily_reward()
        .await
        .map_err(|e| e.to_string())?;

    if claim.success {
        let now = chrono::Utc::now().timestamp();
        save_claim_to_db(&app_handle, profile_id, now).await;
        info!(
            "Claimed daily reward: +{} stars (streak {})",
            claim.reward_amount, claim.streak
        );
    }

    Ok(claim)
}

/// Reward watcher status response sent to the frontend
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardWatcherStatusResponse {
    pub enabled: bool,
    pub last_claim_at: Option<String>,
    pub next_claim_at: Option<String>,
    pub seconds_until_next: i64,
    pub total_claims: u32,
}

#[tauri::command]
pub async fn get_reward_watcher_status(
    app_handle: tauri::AppHandle,
    handle: State<'_, RewardWatcherHandle>,
) -> Result<RewardWatcherStatusResponse, String> {
    let enabled = handle.is_enabled();

    // Read per-profile timestamps from DB and find the soonest
    let state = app_handle.state::<crate::AppState>();
    let db_guard = state.db.read().await;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;
    let pool = db.pool();

    let rows: Vec<(String, String)> = sqlx::query_as::<_, (String, String)>(
        "SELECT key, value FROM settings WHERE key LIKE 'reward_profile_%_last_claim'",
    )
    .fetch_all(pool)
    .await
    .map_err(|e: sqlx::Error| e.to_string())?;

    let now = chrono::Utc::now().timestamp();

    let mut min_seconds_until_next: i64 = i64::MAX;
    let mut latest_claim_epoch: i64 = 0;
    let mut total_claims: u32 = 0;

    for (_key, value) in &rows {
        let last_claim: i64 = value.parse().unwrap_or(0);
        if last_claim > latest_claim_epoch {
            latest_claim_epoch = last_claim;
        }
        let secs = (CLAIM_INTERVAL_SECS - (now - last_claim)).max(0);
        if secs < min_seconds_until_next {
            min_seconds_until_next = secs;
        }
    }
    if min_seconds_until_next == i64::MAX {
        min_seconds_until_next = 0;
    }

    let claim_rows: Vec<(String, String)> = sqlx::query_as::<_, (String, String)>(
        "SELECT key, value FROM settings WHERE key LIKE 'reward_profile_%_total_claims'",
    )
    .fetch_all(pool)
    .await
    .map_err(|e: sqlx::Error| e.to_string())?;

    for (_, value) in &claim_rows {
        total_claims += value.parse::<u32>().unwrap_or(0);
    }

    let last_claim_at = if latest_claim_epoch > 0 {
        chrono::DateTime::from_timestamp(latest_claim_epoch, 0).map(|dt| dt.to_rfc3339())
    } else {
        None
    };

    let next_claim_at = if latest_claim_epoch > 0 {
        chrono::DateTime::from_timestamp(latest_claim_epoch + CLAIM_INTERVAL_SECS, 0)
            .map(|dt| dt.to_rfc3339())
    } else {
        None
    };

    Ok(RewardWatcherStatusResponse {
        enabled,
        last_claim_at,
        next_claim_at,
        seconds_until_next: min_seconds_until_next,
        total_claims,
    })
}

/// Enable or disable the background reward watcher
#[tauri::command]
pub async fn set_reward_watcher_enabled(
    app_handle: tauri::AppHandle,
    handle: State<'_, RewardWatcherHandle>,
    enabled: bool,
) -> Result<bool, String> {
    if enabled {
        handle.enable();
    } else {
        handle.disable();
    }
    save_reward_watcher_enabled(&app_handle, enabled).await;
    Ok(enabled)
}

/// Claim now for ALL saved profiles, not just the active one
#[tauri::command]
pub async fn force_claim_reward(app_handle: tauri::AppHandle) -> Result<String, String> {
    let state = app_handle.state::<crate::AppState>();

    let db_guard = state.db.read().await;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;

    let profiles = fabula_persistence::sqlite::list_profiles(db.pool())
        .await
        .map_err(|e| e.to_string())?;

    if profiles.is_empty() {
        return Err("No profiles saved".to_string());
    }

    drop(db_guard);

    let mut results: Vec<String> = Vec::new();
    let mut any_success = false;

    for profile in &profiles {
        let init_data = match decrypt_token(&app_handle, profile.id).await {
            Ok(t) => t,
            Err(e) => {
                results.push(format!("{}: token error - {}", profile.username, e));
                continue;
            }
        };

        let client =
            fabula_networking::FabulaClient::new_with_cache(&init_data, state.case_cache.clone());

        // Check eligibility first
        match client.check_daily_reward().await {
            Ok(status) => {
                if !status.can_claim {
                    // time_remaining from the API is in MILLISECONDS
                    let remaining_secs = status.time_remaining / 1000;
                    let h = remaining_secs / 3600;
                    let m = (remaining_secs % 3600) / 60;
                    results.push(format!(
                        "{}: not ready ({}h {}m left)",
                        profile.username, h, m
                    ));
                    continue;
                }
            }
            Err(e) => {
                results.push(format!("{}: status check failed - {}", profile.username, e));
                continue;
            }
        }

        match client.claim_daily_reward().await {
            Ok(claim) => {
                any_success = true;

                let now = chrono::Utc::now().timestamp();
                save_claim_to_db(&app_handle, profile.id, now).await;

                results.push(format!(
                    "{}: +{} stars (streak {})",
                    profile.username, claim.reward_amount, claim.streak
                ));
            }
            Err(e) => {
                results.push(format!("{}: claim failed - {}", profile.username, e));
            }
        }
    }

    if any_success {
        Ok(results.join("\n"))
    } else {
        Err(results.join("\n"))
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────

async fn decrypt_token(app_handle: &tauri::AppHandle, profile_id: i64) -> Result<String, String> {
    let state = app_handle.state::<crate::AppState>();
    let db_guard = state.db.read().await;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;

    let encrypted = fabula_persistence::sqlite::get_profile_token(db.pool(), profile_id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("Token not found")?;

    state
        .encryptor
        .decrypt(&encrypted)
        .map_err(|e| e.to_string())
}

async fn save_claim_to_db(app_handle: &tauri::AppHandle, profile_id: i64, now: i64) {
    let state = app_handle.state::<crate::AppState>();
    let db_guard = state.db.read().await;
    let Some(db) = db_guard.as_ref() else { return };
    let pool = db.pool();

    let key_prefix = format!("reward_profile_{}", profile_id);

    let _ = sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = ?2",
    )
    .bind(format!("{}_last_claim", key_prefix))
    .bind(now.to_string())
    .execute(pool)
    .await;

    // Increment total claims
    let total: u32 = sqlx::query_scalar::<sqlx::Sqlite, String>(
        "SELECT value FROM settings WHERE key = ?1",
    )
    .bind(format!("{}_total_claims", key_prefix))
    .fetch_optional(pool)
    .await
    .ok()
    .flatten()
    .and_then(|v: String| v.parse().ok())
    .unwrap_or(0)
        + 1;

    let _ = sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = ?2",
    )
    .bind(format!("{}_total_claims", key_prefix))
    .bind(total.to_string())
    .execute(pool)
    .await;
}
