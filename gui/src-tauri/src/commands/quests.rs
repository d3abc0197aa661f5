//! Quest commands

use crate::AppState;
use fabula_core::{Quest, QuestCheckResponse};
use fabula_networking::api;
use tauri::State;
use tracing::info;

/// List quests, incomplete first
#[tauri::command]
pub async fn get_quests(state: State<'_, AppState>) -> Result<Vec<Quest>, String> {
    let (_, client) = super::active_client(&state).await?;

    api::fetch_quests_sorted(&client)
        .await
        .map_err(|e| e.to_string())
}

/// Claim or verify a quest by task id
///
/// The right endpoint depends on the quest kind, so the current quest
/// list is fetched to look the task up before dispatching.
#[tauri::command]
pub async fn verify_quest(
    task_id: i64,
    state: State<'_, AppState>,
) -> Result<QuestCheckResponse, String> {
    let _guard = state
        .pending
        .begin(&format!("verify_quest:{}", task_id))
        .map_err(|e| e.to_string())?;

    let (_, client) = super::active_client(&state).await?;

    let quests = api::fetch_quests_sorted(&client)
        .await
        .map_err(|e| e.to_string())?;
    let quest = quests
        .iter()
        .find(|q| q.id == task_id)
        .ok_or_else(|| format!("Quest {} not found", task_id))?;

    if quest.completed {
        return Err("Quest already completed".to_string());
    }

    let result = api::verify_quest(&client, quest)
        .await
        .map_err(|e| e.to_string())?;

    if result.completed {
        info!("Quest {} completed, +{} stars", task_id, result.reward);
    } else {
        info!("Quest {} not completed yet", task_id);
    }

    Ok(result)
}
