//! Events sent by the server to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dormdesk_core::types::{IssueId, MessageId, UserId};
use dormdesk_entity::ChatMessage;

/// Server-to-client socket events.
///
/// Note the field spellings: `message_sent` carries `messageId` while the
/// read-receipt events carry `messageID` — an inherited inconsistency the
/// deployed clients depend on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// A user came online (broadcast to everyone).
    UserOnline {
        /// Who came online.
        #[serde(rename = "userId")]
        user_id: UserId,
        /// Always true in this event.
        #[serde(rename = "isOnline")]
        is_online: bool,
        /// The chat they opened, when the announcement came from a join.
        #[serde(rename = "currentChat", default, skip_serializing_if = "Option::is_none")]
        current_chat: Option<IssueId>,
    },
    /// A user went offline (broadcast to everyone).
    UserOffline {
        /// Who went offline.
        #[serde(rename = "userId")]
        user_id: UserId,
        /// Their final activity time.
        #[serde(rename = "lastActive")]
        last_active: DateTime<Utc>,
    },
    /// Join confirmation for the joiner.
    JoinedIssue {
        /// Joined issue.
        #[serde(rename = "issueID")]
        issue_id: IssueId,
        /// Transport-level room name.
        #[serde(rename = "roomName")]
        room_name: String,
        /// Distinct other users already in the chat.
        #[serde(rename = "otherUsersInChat")]
        other_users_in_chat: Vec<UserId>,
    },
    /// Another user entered the chat.
    UserJoinedChat {
        /// Who joined, when their identity is known.
        #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
        user_id: Option<UserId>,
        /// Which chat.
        #[serde(rename = "issueID")]
        issue_id: IssueId,
    },
    /// A user left the chat.
    UserLeftChat {
        /// Who left.
        #[serde(rename = "userId")]
        user_id: UserId,
        /// Which chat.
        #[serde(rename = "issueID")]
        issue_id: IssueId,
    },
    /// Presence answer for a `get_user_presence` request.
    UserPresence {
        /// Subject user.
        #[serde(rename = "userId")]
        user_id: UserId,
        /// Whether they are online.
        #[serde(rename = "isOnline")]
        is_online: bool,
        /// Their last activity time; `null` for a user never seen.
        #[serde(rename = "lastActive")]
        last_active: Option<DateTime<Utc>>,
        /// The chat they have open; `null` if none.
        #[serde(rename = "currentChat")]
        current_chat: Option<IssueId>,
    },
    /// A message was appended to the room's log (fanned out to all
    /// members, the sender included).
    NewMessage(ChatMessage),
    /// Persistence confirmation for the sender.
    MessageSent {
        /// Store-assigned message id.
        #[serde(rename = "messageId")]
        message_id: MessageId,
        /// The persisted (trimmed) text.
        text: String,
        /// Echo of the client's correlation id, if it sent one.
        #[serde(rename = "clientRef", default, skip_serializing_if = "Option::is_none")]
        client_ref: Option<String>,
    },
    /// Another member's typing state changed.
    UserTyping {
        /// Chat being typed in.
        #[serde(rename = "issueID")]
        issue_id: IssueId,
        /// Who is typing.
        #[serde(rename = "senderID")]
        sender_id: UserId,
        /// Typist's role, when known.
        #[serde(rename = "senderRole", default, skip_serializing_if = "Option::is_none")]
        sender_role: Option<String>,
        /// True on start, false on stop.
        #[serde(rename = "isTyping")]
        is_typing: bool,
    },
    /// A message was acknowledged by a reader.
    MessageRead {
        /// Chat the message belongs to.
        #[serde(rename = "issueID")]
        issue_id: IssueId,
        /// The acknowledged message.
        #[serde(rename = "messageID")]
        message_id: MessageId,
        /// When it was (first) read.
        #[serde(rename = "readAt")]
        read_at: DateTime<Utc>,
        /// Who read it.
        #[serde(rename = "readerID")]
        reader_id: UserId,
    },
    /// Message history answer.
    ChatHistory {
        /// Issue whose log was read.
        #[serde(rename = "issueID")]
        issue_id: IssueId,
        /// Messages in append order.
        messages: Vec<ChatMessage>,
    },
    /// Unread-count answer.
    UnreadCount {
        /// Issue whose log was scanned.
        #[serde(rename = "issueID")]
        issue_id: IssueId,
        /// Messages not sent by and not yet read by the requesting user.
        count: usize,
    },
    /// Scoped error, delivered only to the offending connection.
    Error {
        /// Human-readable description.
        message: String,
    },
}
