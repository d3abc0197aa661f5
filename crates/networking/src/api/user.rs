//! User-related API operations

use crate::FabulaClient;
use fabula_core::{Result, UserProfile};

/// Fetch and validate the current user's profile
pub async fn fetch_user_profile(client: &FabulaClient) -> Result<UserProfile> {
    client.get_me().await
}
