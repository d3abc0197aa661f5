//! Reward case commands

use crate::AppState;
use fabula_core::{CaseBox, CaseOpenResponse};
use tauri::State;
use tracing::info;

/// List the user's reward cases (cached for a short window)
#[tauri::command]
pub async fn get_cases(state: State<'_, AppState>) -> Result<Vec<CaseBox>, String> {
    let (_, client) = super::active_client(&state).await?;

    let response = client.get_cases().await.map_err(|e| e.to_string())?;
    Ok(response.cases)
}

/// Open a reward case
///
/// Guarded per case id: mashing the open button fires one request, the
/// rest are rejected until the first resolves. The shared case cache is
/// invalidated by the client on success since ownership counts changed.
#[tauri::command]
pub async fn open_case(
    case_id: String,
    state: State<'_, AppState>,
) -> Result<CaseOpenResponse, String> {
    let _guard = state
        .pending
        .begin(&format!("open_case:{}", case_id))
        .map_err(|e| e.to_string())?;

    let (_, client) = super::active_client(&state).await?;

    let opened = client.open_case(&case_id).await.map_err(|e| e.to_string())?;

    info!(
        "Case {} opened: {:?} x{} ({} copies left)",
        case_id, opened.reward.kind, opened.reward.amount, opened.remaining_count
    );
    Ok(opened)
}

/// Drop the case cache and fetch a fresh list
#[tauri::command]
pub async fn refresh_cases(state: State<'_, AppState>) -> Result<Vec<CaseBox>, String> {
    state.case_cache.invalidate();

    let (_, client) = super::active_client(&state).await?;
    let response = client.get_cases().await.map_err(|e| e.to_string())?;
    Ok(response.cases)
}
