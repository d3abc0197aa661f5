//! User-related models

use serde::{Deserialize, Serialize};

/// Response from `GET /api/user/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: UserData,
}

impl MeResponse {
    /// Convert to UserProfile for internal use
    pub fn into_user_profile(self) -> UserProfile {
        UserProfile {
            id: self.user.id,
            username: self.user.username,
            telegram_id: self.user.telegram_id,
            balance: self.user.balance,
            energy: self.user.energy,
            language: self.user.language,
            onboarding_completed: self.user.onboarding_completed,
        }
    }
}

/// User data as the backend returns it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub telegram_id: i64,
    /// Star balance
    #[serde(default)]
    pub balance: i64,
    /// Chat energy left
    #[serde(default)]
    pub energy: i64,
    /// Two-letter language tag ("ru" / "en")
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(default)]
    pub is_banned: bool,
}

/// User profile (internal representation)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub telegram_id: i64,
    #[serde(default)]
    pub balance: i64,
    #[serde(default)]
    pub energy: i64,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub onboarding_completed: bool,
}

/// Locally stored account (encrypted init-data token stored separately)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub telegram_user_id: Option<i64>,
    pub last_verified: Option<chrono::DateTime<chrono::Utc>>,
    pub is_active: bool,
}

/// Summary of a profile for display in UI (no sensitive data)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: i64,
    pub username: String,
    pub last_verified: Option<String>,
}

impl From<Profile> for ProfileSummary {
    fn from(p: Profile) -> Self {
        ProfileSummary {
            id: p.id,
            username: p.username,
            last_verified: p.last_verified.map(|dt| dt.to_rfc3339()),
        }
    }
}
