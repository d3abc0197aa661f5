//! Quest API operations

use crate::FabulaClient;
use fabula_core::{Quest, QuestCheckResponse, QuestKind, Result};
use tracing::info;

/// Confirm a quest with the backend, using the right endpoint for its kind
///
/// Daily quests self-report through `quest/complete`; everything else
/// goes through a dedicated verification endpoint that inspects the
/// user's actual Telegram state.
pub async fn verify_quest(client: &FabulaClient, quest: &Quest) -> Result<QuestCheckResponse> {
    info!("Verifying quest {} ({:?})", quest.id, quest.kind);
    match quest.kind {
        QuestKind::Daily => client.complete_quest(quest.id).await,
        QuestKind::Subscribe | QuestKind::Join => client.check_subscription(quest.id).await,
        QuestKind::Referral => client.check_referrals(quest.id).await,
        QuestKind::Boost => client.check_boost(quest.id).await,
    }
}

/// Fetch the quest list, completed quests last
pub async fn fetch_quests_sorted(client: &FabulaClient) -> Result<Vec<Quest>> {
    let mut quests = client.get_quests().await?.tasks;
    quests.sort_by_key(|q| q.completed);
    Ok(quests)
}
