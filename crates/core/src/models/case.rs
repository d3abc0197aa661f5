//! Reward case models

use crate::i18n::LocalizedText;
use serde::{Deserialize, Serialize};

/// Response from `GET /api/case/all`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CasesResponse {
    pub cases: Vec<CaseBox>,
}

/// A reward case the user owns or can obtain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseBox {
    pub id: String,
    pub name: LocalizedText,
    #[serde(default)]
    pub description: Option<LocalizedText>,
    #[serde(default)]
    pub media_url: Option<String>,
    /// How many of this case the user currently owns
    #[serde(default)]
    pub count: u32,
}

/// Request body for `POST /api/case/open`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseOpenRequest {
    pub case_id: String,
}

/// What a case yielded. Contents are decided server-side; the client
/// only renders the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseRewardKind {
    Stars,
    Energy,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseReward {
    pub kind: CaseRewardKind,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub media_url: Option<String>,
}

/// Response from `POST /api/case/open`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseOpenResponse {
    pub success: bool,
    pub reward: CaseReward,
    /// Copies of this case left after opening
    #[serde(default)]
    pub remaining_count: u32,
    #[serde(default)]
    pub new_balance: Option<i64>,
}
