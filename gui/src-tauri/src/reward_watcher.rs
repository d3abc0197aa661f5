//! Reward watcher: background auto-claim loop for ALL profiles
//!
//! Periodically checks if each saved profile is eligible for the daily
//! reward and claims it automatically. Uses the server-side
//! `GET /api/dailyReward/check` endpoint before attempting a claim, so
//! cooldowns, 429s, and server-side timing are handled robustly.
//!
//! The watcher runs for all profiles and can be disabled by the user.

use crate::AppState;
use fabula_networking::FabulaClient;
use fabula_persistence::sqlite;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tauri::{Emitter, Manager};
use tauri_plugin_notification::NotificationExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// How often to check / emit countdown (60 seconds)
const CHECK_INTERVAL_SECS: u64 = 60;

/// Back-off after a failed claim attempt (seconds)
const RETRY_BACKOFF_SECS: i64 = 300; // 5 minutes

// ─── Events ──────────────────────────────────────────────────────────

/// Emitted when a claim is successfully made
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardClaimedEvent {
    pub profile_id: i64,
    pub username: String,
    pub reward_amount: i64,
    pub new_balance: i64,
    pub streak: u32,
    pub next_claim_at: Option<String>,
    pub total_claims: u32,
}

/// Emitted every tick with countdown info (shortest countdown across all profiles)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardTickEvent {
    pub enabled: bool,
    pub seconds_until_next: i64,
    pub last_claim_at: Option<String>,
    pub total_claims: u32,
    pub profiles_count: u32,
}

/// Per-profile claim state tracked in memory
#[derive(Debug, Clone)]
struct ProfileClaimState {
    /// Server-reported epoch of the next eligible claim (or our best guess)
    next_eligible_epoch: i64,
    /// Total successful claims for this profile
    total_claims: u32,
    /// Last successful claim timestamp
    last_claim_epoch: i64,
    /// Whether we're currently in a back-off due to error
    backoff_until: i64,
}

// ─── Handle ──────────────────────────────────────────────────────────

/// Handle to control the reward watcher from Tauri commands
#[derive(Clone)]
pub struct RewardWatcherHandle {
    cancel: CancellationToken,
    enabled_tx: Arc<tokio::sync::watch::Sender<bool>>,
}

impl RewardWatcherHandle {
    /// Check if the watcher is enabled
    pub fn is_enabled(&self) -> bool {
        *self.enabled_tx.borrow()
    }

    /// Enable the watcher
    pub fn enable(&self) {
        let _ = self.enabled_tx.send(true);
        info!("Reward watcher enabled");
    }

    /// Disable the watcher (stops claiming but task stays alive)
    pub fn disable(&self) {
        let _ = self.enabled_tx.send(false);
        info!("Reward watcher disabled by user");
    }

    /// Stop the watcher task entirely
    pub fn stop(&self) {
        self.cancel.cancel();
        info!("Reward watcher stopped");
    }
}

// ─── Spawn ───────────────────────────────────────────────────────────

/// Spawn the reward watcher background task.
/// Returns a handle for controlling it.
pub fn spawn_reward_watcher(app_handle: tauri::AppHandle) -> RewardWatcherHandle {
    let cancel = CancellationToken::new();
    let (enabled_tx, enabled_rx) = tokio::sync::watch::channel(true); // enabled by default

    let handle = RewardWatcherHandle {
        cancel: cancel.clone(),
        enabled_tx: Arc::new(enabled_tx),
    };

    // Restore enabled state from DB
    let restore_app = app_handle.clone();
    let restore_handle = handle.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_secs(4)).await;
        let saved = load_reward_watcher_enabled(&restore_app).await;
        if !saved {
            restore_handle.disable();
            info!("Reward watcher: restored disabled state from DB");
        }
    });

    tokio::spawn(watcher_loop(app_handle, cancel, enabled_rx));

    handle
}

// ─── Loop ────────────────────────────────────────────────────────────

async fn watcher_loop(
    app_handle: tauri::AppHandle,
    cancel: CancellationToken,
    enabled_rx: tokio::sync::watch::Receiver<bool>,
) {
    info!("Reward watcher loop started (multi-profile)");

    // Give the app a moment to initialize DB
    tokio::time::sleep(std::time::Duration::from_secs(5)).await;

    // Per-profile tracking: profile_id -> claim state
    let mut profile_states: HashMap<i64, ProfileClaimState> = HashMap::new();

    // Load saved state from DB
    load_all_profile_states(&app_handle, &mut profile_states).await;

    let mut interval = tokio::time::interval(std::time::Duration::from_secs(CHECK_INTERVAL_SECS));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Reward watcher cancelled, exiting");
                return;
            }
            _ = interval.tick() => {
                let now = chrono::Utc::now().timestamp();

                if !*enabled_rx.borrow() {
                    emit_disabled_tick(&app_handle);
                    continue;
                }

                // Get all profiles from DB
                let profiles = match get_all_profiles(&app_handle).await {
                    Ok(p) => p,
                    Err(e) => {
                        debug!("Reward watcher: can't load profiles: {}", e);
                        emit_idle_tick(&app_handle);
                        continue;
                    }
                };

                if profiles.is_empty() {
                    emit_idle_tick(&app_handle);
                    continue;
                }

                // Process each profile
                for profile in &profiles {
                    let state = profile_states
                        .entry(profile.id)
                        .or_insert_with(|| ProfileClaimState {
                            next_eligible_epoch: 0,
                            total_claims: 0,
                            last_claim_epoch: 0,
                            backoff_until: 0,
                        });

                    // Skip if in backoff
                    if now < state.backoff_until {
                        debug!(
                            "Reward watcher: profile {} ({}) in backoff for {}s more",
                            profile.id, profile.username,
                            state.backoff_until - now
                        );
                        continue;
                    }

                    // Skip if we know it's not time yet (with 30s tolerance)
                    let secs_until = (state.next_eligible_epoch - now).max(0);
                    if secs_until > 30 {
                        continue;
                    }

                    // This profile might be eligible, decrypt token and check server
                    let init_data = match decrypt_profile_token(&app_handle, profile.id).await {
                        Ok(t) => t,
                        Err(e) => {
                            debug!("Reward watcher: can't decrypt token for profile {} ({}): {}", profile.id, profile.username, e);
                            state.backoff_until = now + RETRY_BACKOFF_SECS;
                            continue;
                        }
                    };

                    let client = FabulaClient::new_with_cache(&init_data, {
                        let app_state = app_handle.state::<AppState>();
                        app_state.case_cache.clone()
                    });

                    // Step 1: Check eligibility with GET /api/dailyReward/check
                    let reward_status = match client.check_daily_reward().await {
                        Ok(s) => s,
                        Err(e) => {
                            warn!("Reward watcher: status check failed for profile {} ({}): {}", profile.id, profile.username, e);
                            state.backoff_until = now + RETRY_BACKOFF_SECS;
                            continue;
                        }
                    };

                    // Update our tracking from server data
                    // NOTE: time_remaining from API is in MILLISECONDS, convert to seconds
                    let remaining_secs = reward_status.time_remaining / 1000;
                    if !reward_status.can_claim {
                        state.next_eligible_epoch = now + remaining_secs;
                        debug!(
                            "Reward watcher: profile {} ({}) not ready, {}s remaining",
                            profile.id, profile.username, remaining_secs
                        );
                        continue;
                    }

                    // Step 2: Server says we can claim!
                    info!(
                        "Reward watcher: claiming for profile {} ({}), {} stars",
                        profile.id, profile.username, reward_status.reward_amount
                    );

                    match client.claim_daily_reward().await {
                        Ok(claim) => {
                            state.last_claim_epoch = now;
                            state.total_claims += 1;

                            // Parse next_claim_time from server response
                            if let Some(ref nct) = claim.next_claim_time {
                                if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(nct) {
                                    state.next_eligible_epoch = dt.timestamp();
                                } else {
                                    warn!("Reward watcher: couldn't parse next_claim_time '{}', falling back to now+24h", nct);
                                    state.next_eligible_epoch = now + 24 * 3600;
                                }
                            } else {
                                state.next_eligible_epoch = now + 24 * 3600;
                            }

                            state.backoff_until = 0;

                            // Persist
                            save_profile_claim_state(&app_handle, profile.id, state).await;

                            info!(
                                "Reward watcher: profile {} ({}) claimed {} stars (streak: {}, total: {})",
                                profile.id, profile.username,
                                claim.reward_amount,
                                claim.streak,
                                state.total_claims
                            );

                            // Emit claimed event
                            let event = RewardClaimedEvent {
                                profile_id: profile.id,
                                username: profile.username.clone(),
                                reward_amount: claim.reward_amount,
                                new_balance: claim.new_balance,
                                streak: claim.streak,
                                next_claim_at: claim.next_claim_time.clone(),
                                total_claims: state.total_claims,
                            };
                            if let Err(e) = app_handle.emit("reward-claimed", &event) {
                                warn!("Failed to emit reward-claimed: {}", e);
                            }

                            // Native notification
                            let body = format!(
                                "{}: +{} stars (day {} streak)",
                                profile.username, claim.reward_amount, claim.streak
                            );
                            if let Err(e) = app_handle
                                .notification()
                                .builder()
                                .title("Daily reward claimed")
                                .body(&body)
                                .show()
                            {
                                debug!("Notification failed: {}", e);
                            }
                        }
                        Err(e) => {
                            let err_str = e.to_string();
                            error!("Reward watcher: claim failed for profile {} ({}): {}", profile.id, profile.username, err_str);
                            // Could be a 429 rate limit or other server error
                            state.backoff_until = now + RETRY_BACKOFF_SECS;
                        }
                    }
                }

                // Calculate aggregate tick data
                let mut min_seconds_until_next: i64 = i64::MAX;
                let mut total_claims_all: u32 = 0;
                let mut last_claim_epoch_any: i64 = 0;

                for state in profile_states.values() {
                    total_claims_all += state.total_claims;
                    if state.last_claim_epoch > last_claim_epoch_any {
                        last_claim_epoch_any = state.last_claim_epoch;
                    }
                    let secs = (state.next_eligible_epoch - now).max(0);
                    if secs < min_seconds_until_next {
                        min_seconds_until_next = secs;
                    }
                }
                if min_seconds_until_next == i64::MAX {
                    min_seconds_until_next = 0;
                }

                // Emit tick with aggregate data
                let tick = RewardTickEvent {
                    enabled: *enabled_rx.borrow(),
                    seconds_until_next: min_seconds_until_next,
                    last_claim_at: if last_claim_epoch_any > 0 {
                        chrono::DateTime::from_timestamp(last_claim_epoch_any, 0)
                            .map(|dt| dt.to_rfc3339())
                    } else {
                        None
                    },
                    total_claims: total_claims_all,
                    profiles_count: profiles.len() as u32,
                };

                if let Err(e) = app_handle.emit("reward-tick", &tick) {
                    warn!("Failed to emit reward-tick: {}", e);
                }
            }
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn emit_idle_tick(app_handle: &tauri::AppHandle) {
    let tick = RewardTickEvent {
        enabled: true,
        seconds_until_next: 0,
        last_claim_at: None,
        total_claims: 0,
        profiles_count: 0,
    };
    let _ = app_handle.emit("reward-tick", &tick);
}

fn emit_disabled_tick(app_handle: &tauri::AppHandle) {
    let tick = RewardTickEvent {
        enabled: false,
        seconds_until_next: 0,
        last_claim_at: None,
        total_claims: 0,
        profiles_count: 0,
    };
    let _ = app_handle.emit("reward-tick", &tick);
}

/// Get all profiles from the database
async fn get_all_profiles(
    app_handle: &tauri::AppHandle,
) -> Result<Vec<fabula_core::Profile>, String> {
    let state = app_handle.state::<AppState>();
    let db_guard = state.db.read().await;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;

    sqlite::list_profiles(db.pool())
        .await
        .map_err(|e| e.to_string())
}

/// Decrypt a profile's init-data token
async fn decrypt_profile_token(
    app_handle: &tauri::AppHandle,
    profile_id: i64,
) -> Result<String, String> {
    let state = app_handle.state::<AppState>();
    let db_guard = state.db.read().await;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;

    let encrypted = sqlite::get_profile_token(db.pool(), profile_id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or("Profile token not found")?;

    state
        .encryptor
        .decrypt(&encrypted)
        .map_err(|e| e.to_string())
}

/// Load per-profile claim states from the settings table
async fn load_all_profile_states(
    app_handle: &tauri::AppHandle,
    states: &mut HashMap<i64, ProfileClaimState>,
) {
    let app_state = app_handle.state::<AppState>();
    let db_guard = app_state.db.read().await;
    let Some(db) = db_guard.as_ref() else { return };

    // Load all reward_profile_* keys
    let rows: Vec<(String, String)> = match sqlx::query_as::<_, (String, String)>(
        "SELECT key, value FROM settings WHERE key LIKE 'reward_profile_%'",
    )
    .fetch_all(db.pool())
    .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!("Failed to load reward watcher profile states: {}", e);
            return;
        }
    };

    for (key, value) in rows {
        // Keys are like: reward_profile_42_last_claim, reward_profile_42_total_claims
        let rest = match key.strip_prefix("reward_profile_") {
            Some(r) => r,
            None => continue,
        };
        let (id_str, field) = match rest.find('_') {
            Some(pos) => (&rest[..pos], &rest[pos + 1..]),
            None => continue,
        };
        let profile_id: i64 = match id_str.parse() {
            Ok(id) => id,
            Err(_) => continue,
        };

        let state = states
            .entry(profile_id)
            .or_insert_with(|| ProfileClaimState {
                next_eligible_epoch: 0,
                total_claims: 0,
                last_claim_epoch: 0,
                backoff_until: 0,
            });

        match field {
            "last_claim" => {
                state.last_claim_epoch = value.parse().unwrap_or(0);
                if state.last_claim_epoch > 0 {
                    state.next_eligible_epoch = state.last_claim_epoch + 24 * 3600;
                }
            }
            "total_claims" => {
                state.total_claims = value.parse().unwrap_or(0);
            }
            _ => {}
        }
    }
}

/// Save per-profile claim state to DB
async fn save_profile_claim_state(
    app_handle: &tauri::AppHandle,
    profile_id: i64,
    state: &ProfileClaimState,
) {
    let app_state = app_handle.state::<AppState>();
    let db_guard = app_state.db.read().await;
    let Some(db) = db_guard.as_ref() else { return };
    let pool = db.pool();

    let key_prefix = format!("reward_profile_{}", profile_id);

    let _ = sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = ?2",
    )
    .bind(format!("{}_last_claim", key_prefix))
    .bind(state.last_claim_epoch.to_string())
    .execute(pool)
    .await;

    let _ = sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = ?2",
    )
    .bind(format!("{}_total_claims", key_prefix))
    .bind(state.total_claims.to_string())
    .execute(pool)
    .await;
}

/// Save whether the reward watcher is enabled
pub async fn save_reward_watcher_enabled(app_handle: &tauri::AppHandle, enabled: bool) {
    let app_state = app_handle.state::<AppState>();
    let db_guard = app_state.db.read().await;
    let Some(db) = db_guard.as_ref() else { return };

    let _ = sqlx::query(
        "INSERT INTO settings (key, value) VALUES ('reward_watcher_enabled', ?1)
         ON CONFLICT(key) DO UPDATE SET value = ?1",
    )
    .bind(if enabled { "true" } else { "false" })
    .execute(db.pool())
    .await;
}

/// Load reward watcher enabled state from DB
async fn load_reward_watcher_enabled(app_handle: &tauri::AppHandle) -> bool {
    let app_state = app_handle.state::<AppState>();
    let db_guard = app_state.db.read().await;
    let Some(db) = db_guard.as_ref() else { return true };

    sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = 'reward_watcher_enabled'")
        .fetch_optional(db.pool())
        .await
        .ok()
        .flatten()
        .map(|v| v != "false")
        .unwrap_or(true) // default: enabled
}
