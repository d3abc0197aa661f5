//! Daily reward API operations

use crate::FabulaClient;
use fabula_core::{DailyRewardClaim, DailyRewardInfo, DailyRewardStatus, Result};

/// Check reward claim status
pub async fn get_reward_status(client: &FabulaClient) -> Result<DailyRewardStatus> {
    client.check_daily_reward().await
}

/// Get the reward ladder for the current streak cycle
pub async fn get_reward_ladder(client: &FabulaClient) -> Result<DailyRewardInfo> {
    client.get_daily_reward().await
}

/// Claim the daily reward if available
pub async fn claim_reward(client: &FabulaClient) -> Result<DailyRewardClaim> {
    client.claim_daily_reward().await
}
