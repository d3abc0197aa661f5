//! First-run onboarding and UI localization commands

use crate::AppState;
use fabula_core::i18n::{onboarding_texts, translate, Language, OnboardingTexts};
use serde::Serialize;
use std::collections::HashMap;
use tauri::State;

/// Localized copy for the first-run flow
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingView {
    /// Resolved language tag the copy is in
    pub language: &'static str,
    pub texts: OnboardingTexts,
}

/// Onboarding copy for the resolved language
#[tauri::command]
pub async fn get_onboarding(
    lang: Option<String>,
    state: State<'_, AppState>,
) -> Result<OnboardingView, String> {
    let settings = super::settings::load_app_settings(&state).await;
    let language = Language::resolve(lang.as_deref(), settings.default_language.as_deref());

    Ok(OnboardingView {
        language: language.tag(),
        texts: onboarding_texts(language),
    })
}

/// Translate a batch of static UI keys
///
/// Unknown keys come back unchanged, so a missing entry degrades to the
/// key itself rather than a blank label.
#[tauri::command]
pub async fn translate_ui(
    keys: Vec<String>,
    lang: Option<String>,
    state: State<'_, AppState>,
) -> Result<HashMap<String, String>, String> {
    let settings = super::settings::load_app_settings(&state).await;
    let language = Language::resolve(lang.as_deref(), settings.default_language.as_deref());

    Ok(keys
        .into_iter()
        .map(|key| {
            let value = translate(&key, language).to_string();
            (key, value)
        })
        .collect())
}
