//! Daily reward models for the /api/dailyReward endpoints

use serde::{Deserialize, Serialize};

/// Response from `GET /api/dailyReward/check`: claim eligibility
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRewardStatus {
    /// Whether the user can currently claim
    pub can_claim: bool,
    /// Stars awarded if claimable
    #[serde(default)]
    pub reward_amount: i64,
    /// Consecutive-day streak
    #[serde(default)]
    pub streak: u32,
    /// Milliseconds remaining until next claim (0 if claimable)
    /// NOTE: the server reports milliseconds, convert with / 1000
    #[serde(default)]
    pub time_remaining: i64,
    /// ISO timestamp of when the next claim opens
    pub next_claim_time: Option<String>,
    /// ISO timestamp of the last claim
    pub last_claim_time: Option<String>,
}

/// Response from `GET /api/dailyReward/get`: the reward ladder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRewardInfo {
    /// 1-based day within the current streak cycle
    #[serde(default)]
    pub current_day: u32,
    /// Star amounts per day of the cycle
    #[serde(default)]
    pub rewards: Vec<i64>,
}

/// Response from `POST /api/dailyReward/claim`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRewardClaim {
    pub success: bool,
    #[serde(default)]
    pub reward_amount: i64,
    /// Star balance after claiming
    #[serde(default)]
    pub new_balance: i64,
    #[serde(default)]
    pub streak: u32,
    pub next_claim_time: Option<String>,
}
