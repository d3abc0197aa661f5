//! Public AI agent listings

use crate::i18n::LocalizedText;
use serde::{Deserialize, Serialize};

/// Response from `GET /api/agent/public/all`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsResponse {
    pub agents: Vec<Agent>,
}

/// A public AI agent the user can chat with
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tagline: Option<LocalizedText>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Story key this agent belongs to (e.g. "starwars")
    #[serde(default)]
    pub story: Option<String>,
}
