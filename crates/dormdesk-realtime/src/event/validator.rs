//! Payload validation rules.
//!
//! Validation happens before any state is touched; a rejected payload
//! leaves the registries and the log untouched. Error messages are part
//! of the client contract.

use dormdesk_core::types::{IssueId, MessageId, UserId};
use dormdesk_core::{AppError, AppResult};
use dormdesk_entity::{MessageDraft, SenderRole};

/// Validates a `join_issue` payload.
pub fn validate_join(issue_id: &IssueId) -> AppResult<()> {
    if issue_id.is_blank() {
        return Err(AppError::validation("Issue ID is required"));
    }
    Ok(())
}

/// Validates a `send_message` payload and produces the draft to persist.
///
/// The text survives trimmed; a whitespace-only body is rejected outright.
pub fn validate_send(
    issue_id: &IssueId,
    sender_id: &UserId,
    sender_role: &str,
    text: &str,
) -> AppResult<MessageDraft> {
    let trimmed = text.trim();
    if issue_id.is_blank() || sender_id.is_blank() || sender_role.is_empty() || trimmed.is_empty() {
        return Err(AppError::validation("Invalid message data"));
    }

    let sender_role: SenderRole = sender_role
        .parse()
        .map_err(|_| AppError::validation("Invalid sender role"))?;

    Ok(MessageDraft {
        issue_id: issue_id.clone(),
        sender_id: sender_id.clone(),
        sender_role,
        text: trimmed.to_string(),
    })
}

/// Validates a `mark_message_read` payload.
pub fn validate_mark_read(
    issue_id: &IssueId,
    message_id: &MessageId,
    reader_id: &UserId,
) -> AppResult<()> {
    if issue_id.is_blank() || message_id.is_blank() || reader_id.is_blank() {
        return Err(AppError::validation("Invalid read receipt data"));
    }
    Ok(())
}
