//! Public agent listing commands

use crate::AppState;
use fabula_core::i18n::{story_display_name, Language};
use serde::Serialize;
use tauri::State;

/// Agent decorated for display in the picker
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentView {
    pub id: String,
    pub name: String,
    pub tagline: Option<String>,
    pub avatar_url: Option<String>,
    pub story: Option<String>,
    /// Localized display name of the story the agent belongs to
    pub story_name: Option<String>,
}

/// List the public story agents, localized for the given language tag
///
/// When `lang` is omitted the app-level default applies, then English.
#[tauri::command]
pub async fn list_agents(
    lang: Option<String>,
    state: State<'_, AppState>,
) -> Result<Vec<AgentView>, String> {
    let settings = super::settings::load_app_settings(&state).await;
    let language = Language::resolve(lang.as_deref(), settings.default_language.as_deref());

    let (_, client) = super::active_client(&state).await?;
    let response = client
        .get_public_agents()
        .await
        .map_err(|e| e.to_string())?;

    Ok(response
        .agents
        .into_iter()
        .map(|agent| AgentView {
            id: agent.id,
            name: agent.name,
            tagline: agent.tagline.map(|t| t.get(language).to_string()),
            avatar_url: agent.avatar_url,
            story_name: agent
                .story
                .as_deref()
                .map(|key| story_display_name(key, language)),
            story: agent.story,
        })
        .collect())
}
