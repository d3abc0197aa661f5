//! Chat API operations with reply cleanup

use crate::FabulaClient;
use fabula_core::text::clean_agent_reply;
use fabula_core::{ChatLog, Error, Result, SendMessageResponse};
use tracing::{debug, info};

/// Send a chat message and return the cleaned exchange
///
/// The agent reply is stripped of inline choice blocks before it is
/// handed to the caller, so everything downstream (UI, archive) sees
/// plain prose.
pub async fn send_chat_message(
    client: &FabulaClient,
    text: &str,
) -> Result<SendMessageResponse> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidData("Message must not be empty".to_string()));
    }

    info!("Sending chat message");
    let mut sent = client.send_message(trimmed).await?;
    sent.reply.text = clean_agent_reply(&sent.reply.text);
    Ok(sent)
}

/// Load the next (older) page of chat history into the log
///
/// Returns how many previously unseen messages were added. Calling
/// this on an exhausted log is a no-op.
pub async fn load_older_messages(
    client: &FabulaClient,
    log: &mut ChatLog,
    limit: u32,
) -> Result<usize> {
    if log.is_exhausted() {
        debug!("Chat history already exhausted, skipping fetch");
        return Ok(0);
    }

    let mut page = client.get_chat_history(limit, log.cursor()).await?;
    for message in &mut page.items {
        if !message.from_user {
            message.text = clean_agent_reply(&message.text);
        }
    }

    let added = log.merge_page(page);
    debug!("Merged history page: {} new messages", added);
    Ok(added)
}
