//! Chat models and client-side history pagination

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single chat turn
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub text: String,
    /// true if the user sent it, false for the agent
    pub from_user: bool,
    /// ISO timestamp as returned by the server
    #[serde(default)]
    pub created_at: String,
}

/// One page from `GET /api/message/history`
///
/// Items are ordered newest first; `next_cursor` is an opaque
/// server-assigned token for the page of older messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryPage {
    pub items: Vec<ChatMessage>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Response from `POST /api/message/`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub user_message: ChatMessage,
    pub reply: ChatMessage,
    /// Energy left after the send
    #[serde(default)]
    pub energy: i64,
}

/// Response from `GET /api/message/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStatus {
    pub can_send: bool,
    #[serde(default)]
    pub energy: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Client-side view of the paginated chat history.
///
/// Holds messages ordered oldest to newest and merges incoming pages of
/// older history. Duplicate message ids are dropped, so re-fetching a
/// page (or an overlapping one) never produces repeated turns. Pagination
/// is exhausted once the server clears `has_more` or returns an empty
/// page.
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    seen: HashSet<i64>,
    cursor: Option<String>,
    exhausted: bool,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages ordered oldest to newest
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Cursor to request the next (older) page with
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// True once there is no more history to fetch
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Merge a page of older history. Returns the number of messages
    /// actually added (duplicates are skipped).
    pub fn merge_page(&mut self, page: ChatHistoryPage) -> usize {
        if page.items.is_empty() {
            self.exhausted = true;
            return 0;
        }

        // Page arrives newest first; prepend in chronological order.
        let mut fresh: Vec<ChatMessage> = page
            .items
            .into_iter()
            .filter(|m| self.seen.insert(m.id))
            .collect();
        fresh.reverse();

        let added = fresh.len();
        fresh.extend(self.messages.drain(..));
        self.messages = fresh;

        self.cursor = page.next_cursor;
        if !page.has_more {
            self.exhausted = true;
        }
        added
    }

    /// Append a just-sent turn (live message, not from pagination)
    pub fn push_live(&mut self, message: ChatMessage) {
        if self.seen.insert(message.id) {
            self.messages.push(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: i64, text: &str) -> ChatMessage {
        ChatMessage {
            id,
            text: text.to_string(),
            from_user: id % 2 == 0,
            created_at: String::new(),
        }
    }

    fn page(ids: &[i64], cursor: Option<&str>, has_more: bool) -> ChatHistoryPage {
        ChatHistoryPage {
            items: ids.iter().map(|&id| msg(id, "m")).collect(),
            next_cursor: cursor.map(|c| c.to_string()),
            has_more,
        }
    }

    #[test]
    fn test_merge_orders_oldest_to_newest() {
        let mut log = ChatLog::new();
        log.merge_page(page(&[5, 4, 3], Some("c1"), true));
        let ids: Vec<i64> = log.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
        assert_eq!(log.cursor(), Some("c1"));
        assert!(!log.is_exhausted());
    }

    #[test]
    fn test_merge_prepends_older_page() {
        let mut log = ChatLog::new();
        log.merge_page(page(&[5, 4, 3], Some("c1"), true));
        log.merge_page(page(&[2, 1], None, false));
        let ids: Vec<i64> = log.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert!(log.is_exhausted());
    }

    #[test]
    fn test_merge_drops_duplicate_ids() {
        let mut log = ChatLog::new();
        log.merge_page(page(&[5, 4, 3], Some("c1"), true));
        // Overlapping page repeats id 3
        let added = log.merge_page(page(&[3, 2], Some("c2"), true));
        assert_eq!(added, 1);
        let ids: Vec<i64> = log.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_page_exhausts() {
        let mut log = ChatLog::new();
        log.merge_page(page(&[2, 1], Some("c1"), true));
        let added = log.merge_page(page(&[], Some("c2"), true));
        assert_eq!(added, 0);
        assert!(log.is_exhausted());
        // Cursor from the empty page is not adopted
        assert_eq!(log.cursor(), Some("c1"));
    }

    #[test]
    fn test_push_live_ignores_known_id() {
        let mut log = ChatLog::new();
        log.merge_page(page(&[2, 1], None, false));
        log.push_live(msg(3, "new"));
        log.push_live(msg(3, "dup"));
        let ids: Vec<i64> = log.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
