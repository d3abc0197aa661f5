//! Quest/task models

use serde::{Deserialize, Serialize};

/// Quest kinds as the backend reports them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestKind {
    Daily,
    Subscribe,
    Join,
    Referral,
    Boost,
}

impl QuestKind {
    /// Whether completion is confirmed through a dedicated check endpoint
    /// rather than `quest/complete`
    pub fn needs_verification(&self) -> bool {
        matches!(
            self,
            QuestKind::Subscribe | QuestKind::Join | QuestKind::Referral | QuestKind::Boost
        )
    }
}

/// Progress counters for quests that track a target (e.g. referrals)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestProgress {
    pub current: u32,
    pub required: u32,
}

/// A single quest from `GET /api/quest/my-tasks`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    #[serde(rename = "taskId")]
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: QuestKind,
    #[serde(default)]
    pub title: String,
    pub completed: bool,
    /// Stars awarded on completion
    #[serde(default)]
    pub reward: i64,
    #[serde(default)]
    pub progress: Option<QuestProgress>,
    /// Channel/chat link for subscribe and join quests
    #[serde(default)]
    pub link: Option<String>,
}

/// Response from `GET /api/quest/my-tasks`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestsResponse {
    pub tasks: Vec<Quest>,
}

/// Request body for `POST /api/quest/complete` and the check endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestActionRequest {
    pub task_id: i64,
}

/// Response from complete/check endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestCheckResponse {
    pub completed: bool,
    #[serde(default)]
    pub reward: i64,
    #[serde(default)]
    pub new_balance: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_split() {
        assert!(!QuestKind::Daily.needs_verification());
        for kind in [
            QuestKind::Subscribe,
            QuestKind::Join,
            QuestKind::Referral,
            QuestKind::Boost,
        ] {
            assert!(kind.needs_verification());
        }
    }

    #[test]
    fn test_quest_wire_shape() {
        let json = r#"{
            "taskId": 7,
            "type": "referral",
            "title": "Invite friends",
            "completed": false,
            "reward": 50,
            "progress": {"current": 2, "required": 5}
        }"#;
        let quest: Quest = serde_json::from_str(json).unwrap();
        assert_eq!(quest.id, 7);
        assert_eq!(quest.kind, QuestKind::Referral);
        assert_eq!(quest.progress.unwrap().required, 5);
    }
}
