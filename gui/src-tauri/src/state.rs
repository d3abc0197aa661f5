//! Application state management

use fabula_core::{ChatLog, Error};
use fabula_persistence::cache::CaseCache;
use fabula_persistence::{Database, TokenEncryptor};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

/// Global application state shared across Tauri commands
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<RwLock<Option<Database>>>,
    pub encryptor: Arc<TokenEncryptor>,
    pub data_dir: PathBuf,
    /// Shared case cache for reducing API calls across all modules
    pub case_cache: Arc<CaseCache>,
    /// Tracks user actions with a request in flight
    pub pending: Arc<PendingActions>,
    /// In-memory chat history for the active profile
    pub chat_log: Arc<tokio::sync::Mutex<ChatLog>>,
}

impl AppState {
    /// Create new application state
    pub fn new(data_dir: PathBuf, encryption_key: &[u8]) -> Result<Self, String> {
        let encryptor = TokenEncryptor::new(encryption_key).map_err(|e| e.to_string())?;

        Ok(Self {
            db: Arc::new(RwLock::new(None)),
            encryptor: Arc::new(encryptor),
            data_dir,
            case_cache: Arc::new(CaseCache::default()),
            pending: Arc::new(PendingActions::default()),
            chat_log: Arc::new(tokio::sync::Mutex::new(ChatLog::new())),
        })
    }

    /// Initialize the database connection
    pub async fn init_db(&self) -> Result<(), String> {
        let db_path = self.data_dir.join("fabula.db");
        let db = Database::connect(&db_path).await.map_err(|e| e.to_string())?;

        let mut db_lock = self.db.write().await;
        *db_lock = Some(db);

        Ok(())
    }
}

/// Set of user actions currently awaiting a server response.
///
/// Button handlers register here before calling the API, so a second
/// click while the first request is still in flight is rejected instead
/// of firing a duplicate request.
#[derive(Default)]
pub struct PendingActions {
    keys: Mutex<HashSet<String>>,
}

impl PendingActions {
    /// Register `action` as in flight. Fails if it already is.
    ///
    /// The returned guard releases the action when dropped, including
    /// on early return and panic.
    pub fn begin(self: &Arc<Self>, action: &str) -> Result<PendingGuard, Error> {
        let mut keys = self
            .keys
            .lock()
            .map_err(|_| Error::Unknown("pending action set poisoned".to_string()))?;

        if !keys.insert(action.to_string()) {
            return Err(Error::ActionPending(action.to_string()));
        }

        Ok(PendingGuard {
            owner: Arc::clone(self),
            action: action.to_string(),
        })
    }

    /// Check whether `action` is currently in flight
    pub fn is_pending(&self, action: &str) -> bool {
        self.keys
            .lock()
            .map(|keys| keys.contains(action))
            .unwrap_or(false)
    }
}

/// RAII guard for an in-flight action
pub struct PendingGuard {
    owner: Arc<PendingActions>,
    action: String,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if let Ok(mut keys) = self.owner.keys.lock() {
            keys.remove(&self.action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_rejected_while_pending() {
        let pending = Arc::new(PendingActions::default());

        let guard = pending.begin("open_case:common").unwrap();
        assert!(pending.is_pending("open_case:common"));

        let second = pending.begin("open_case:common");
        assert!(matches!(second, Err(Error::ActionPending(_))));

        drop(guard);
        assert!(!pending.is_pending("open_case:common"));
        assert!(pending.begin("open_case:common").is_ok());
    }

    #[test]
    fn test_distinct_actions_do_not_block_each_other() {
        let pending = Arc::new(PendingActions::default());

        let _a = pending.begin("open_case:common").unwrap();
        let _b = pending.begin("open_case:rare").unwrap();
        let _c = pending.begin("send_message").unwrap();

        assert!(pending.is_pending("open_case:rare"));
    }

    #[test]
    fn test_guard_releases_on_panic() {
        let pending = Arc::new(PendingActions::default());

        let inner = Arc::clone(&pending);
        let result = std::panic::catch_unwind(move || {
            let _guard = inner.begin("claim_daily_reward").unwrap();
            panic!("handler blew up");
        });

        assert!(result.is_err());
        assert!(!pending.is_pending("claim_daily_reward"));
    }
}
