//! Events sent by the client to the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dormdesk_core::types::{IssueId, MessageId, UserId};

/// Client-to-server socket events.
///
/// Sender roles arrive as raw strings and are validated by the router, so
/// that a bad role yields a scoped `error` event rather than a parse
/// failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Announce the connecting user's identity.
    RegisterUser {
        /// Verified user identifier.
        #[serde(rename = "userId")]
        user_id: UserId,
    },
    /// Join an issue's chat room (implicitly leaving any previous room).
    JoinIssue {
        /// Issue to join.
        #[serde(rename = "issueID")]
        issue_id: IssueId,
        /// Identity, when not already registered on this connection.
        #[serde(rename = "userId", default)]
        user_id: Option<UserId>,
    },
    /// Leave an issue's chat room.
    LeaveIssue {
        /// Issue to leave.
        #[serde(rename = "issueID")]
        issue_id: IssueId,
    },
    /// Ask for another user's presence relative to an issue.
    GetUserPresence {
        /// Subject user.
        #[serde(rename = "userId")]
        user_id: UserId,
        /// Issue whose chat the requester cares about.
        #[serde(rename = "issueID", default)]
        issue_id: Option<IssueId>,
    },
    /// Send a chat message.
    SendMessage {
        /// Target issue.
        #[serde(rename = "issueID")]
        issue_id: IssueId,
        /// Author.
        #[serde(rename = "senderID")]
        sender_id: UserId,
        /// Author's role (validated against the allowed set).
        #[serde(rename = "senderRole")]
        sender_role: String,
        /// Message body.
        text: String,
        /// Client-chosen correlation id, echoed back in `message_sent` so
        /// the client can reconcile its provisional message.
        #[serde(rename = "clientRef", default, skip_serializing_if = "Option::is_none")]
        client_ref: Option<String>,
    },
    /// The sender started typing.
    TypingStart {
        /// Issue being typed in.
        #[serde(rename = "issueID")]
        issue_id: IssueId,
        /// Who is typing.
        #[serde(rename = "senderID")]
        sender_id: UserId,
        /// Typist's role, if the client supplies it.
        #[serde(rename = "senderRole", default)]
        sender_role: Option<String>,
    },
    /// The sender stopped typing.
    TypingStop {
        /// Issue being typed in.
        #[serde(rename = "issueID")]
        issue_id: IssueId,
        /// Who stopped.
        #[serde(rename = "senderID")]
        sender_id: UserId,
    },
    /// Acknowledge a message as read.
    MarkMessageRead {
        /// Issue the message belongs to.
        #[serde(rename = "issueID")]
        issue_id: IssueId,
        /// Message being acknowledged.
        #[serde(rename = "messageID")]
        message_id: MessageId,
        /// Who read it.
        #[serde(rename = "readerID")]
        reader_id: UserId,
    },
    /// Load an issue's message history.
    GetChatHistory {
        /// Issue whose log to read.
        #[serde(rename = "issueID")]
        issue_id: IssueId,
        /// Only messages strictly after this instant, if given.
        #[serde(default)]
        since: Option<DateTime<Utc>>,
    },
    /// Count messages unread by a user in an issue.
    GetUnreadCount {
        /// Issue whose log to scan.
        #[serde(rename = "issueID")]
        issue_id: IssueId,
        /// Reader the count is computed for.
        #[serde(rename = "userId")]
        user_id: UserId,
    },
}
