//! End-to-end chat scenarios driven through the router.

use dormdesk_core::types::{IssueId, UserId};
use dormdesk_entity::ChatMessage;
use dormdesk_realtime::{InboundEvent, OutboundEvent};
use dormdesk_store::MessageStore;

use crate::helpers::TestChat;

fn join(issue: &str, user: &str) -> InboundEvent {
    InboundEvent::JoinIssue {
        issue_id: IssueId::new(issue),
        user_id: Some(UserId::new(user)),
    }
}

fn send_text(issue: &str, sender: &str, role: &str, text: &str) -> InboundEvent {
    InboundEvent::SendMessage {
        issue_id: IssueId::new(issue),
        sender_id: UserId::new(sender),
        sender_role: role.to_string(),
        text: text.to_string(),
        client_ref: None,
    }
}

fn new_messages(events: &[OutboundEvent]) -> Vec<&ChatMessage> {
    events
        .iter()
        .filter_map(|event| match event {
            OutboundEvent::NewMessage(message) => Some(message),
            _ => None,
        })
        .collect()
}

fn errors(events: &[OutboundEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|event| match event {
            OutboundEvent::Error { message } => Some(message.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_two_user_chat_round_trip() {
    let chat = TestChat::new();
    let mut a = chat.connect();
    let mut b = chat.connect();

    // B (the assigned worker) opens the chat first.
    chat.send(&b, join("issue-42", "user-b")).await;
    a.drain();
    b.drain();

    // A joins and learns B is already here.
    chat.send(&a, join("issue-42", "user-a")).await;
    let a_events = a.drain();
    let (others, room_name) = a_events
        .iter()
        .find_map(|event| match event {
            OutboundEvent::JoinedIssue {
                other_users_in_chat,
                room_name,
                ..
            } => Some((other_users_in_chat.clone(), room_name.clone())),
            _ => None,
        })
        .expect("joined_issue was not emitted");
    assert_eq!(others, vec![UserId::new("user-b")]);
    assert_eq!(room_name, "issue_issue-42");

    let b_events = b.drain();
    assert!(
        b_events.iter().any(|event| matches!(
            event,
            OutboundEvent::UserJoinedChat { user_id: Some(user), .. }
                if user == &UserId::new("user-a")
        )),
        "room members must learn about the joiner"
    );

    // B sends a message; A receives the full record.
    chat.send(&b, send_text("issue-42", "user-b", "worker", "hello"))
        .await;
    let a_events = a.drain();
    let received = new_messages(&a_events);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].sender_id, UserId::new("user-b"));
    assert_eq!(received[0].text, "hello");
    assert!(received[0].sent);
    assert!(!received[0].read);

    let b_events = b.drain();
    assert_eq!(new_messages(&b_events).len(), 1, "sender gets the fan-out too");
    let message_id = b_events
        .iter()
        .find_map(|event| match event {
            OutboundEvent::MessageSent { message_id, .. } => Some(message_id.clone()),
            _ => None,
        })
        .expect("message_sent was not emitted");

    // A acknowledges; B is notified.
    chat.send(
        &a,
        InboundEvent::MarkMessageRead {
            issue_id: IssueId::new("issue-42"),
            message_id: message_id.clone(),
            reader_id: UserId::new("user-a"),
        },
    )
    .await;
    let b_events = b.drain();
    assert!(b_events.iter().any(|event| matches!(
        event,
        OutboundEvent::MessageRead { reader_id, .. } if reader_id == &UserId::new("user-a")
    )));

    // B reads as present in the chat...
    chat.send(
        &a,
        InboundEvent::GetUserPresence {
            user_id: UserId::new("user-b"),
            issue_id: Some(IssueId::new("issue-42")),
        },
    )
    .await;
    let a_events = a.drain();
    assert!(a_events.iter().any(|event| matches!(
        event,
        OutboundEvent::UserPresence {
            is_online: true,
            current_chat: Some(current),
            ..
        } if current == &IssueId::new("issue-42")
    )));

    // ...until B disconnects.
    chat.disconnect(&b);
    let a_events = a.drain();
    assert!(a_events.iter().any(|event| matches!(
        event,
        OutboundEvent::UserOffline { user_id, .. } if user_id == &UserId::new("user-b")
    )));
    assert!(a_events.iter().any(|event| matches!(
        event,
        OutboundEvent::UserLeftChat { user_id, .. } if user_id == &UserId::new("user-b")
    )));

    chat.send(
        &a,
        InboundEvent::GetUserPresence {
            user_id: UserId::new("user-b"),
            issue_id: Some(IssueId::new("issue-42")),
        },
    )
    .await;
    let a_events = a.drain();
    assert!(a_events.iter().any(|event| matches!(
        event,
        OutboundEvent::UserPresence {
            is_online: false,
            current_chat: None,
            ..
        }
    )));
}

#[tokio::test]
async fn test_joining_a_second_room_leaves_the_first() {
    let chat = TestChat::new();
    let mut a = chat.connect();

    chat.send(&a, join("issue-1", "user-a")).await;
    chat.send(&a, join("issue-2", "user-a")).await;
    a.drain();

    // A fresh occupant of issue-1 finds nobody there.
    let mut c = chat.connect();
    chat.send(&c, join("issue-1", "user-c")).await;
    let events = c.drain();
    let others = events
        .iter()
        .find_map(|event| match event {
            OutboundEvent::JoinedIssue {
                other_users_in_chat,
                ..
            } => Some(other_users_in_chat.clone()),
            _ => None,
        })
        .expect("joined_issue was not emitted");
    assert!(others.is_empty(), "user-a should have left issue-1 on switching");
}

#[tokio::test]
async fn test_whitespace_only_message_is_rejected() {
    let chat = TestChat::new();
    let mut a = chat.connect();
    let mut b = chat.connect();
    chat.send(&a, join("issue-7", "user-a")).await;
    chat.send(&b, join("issue-7", "user-b")).await;
    a.drain();
    b.drain();

    chat.send(&a, send_text("issue-7", "user-a", "student", "   "))
        .await;

    let a_events = a.drain();
    assert_eq!(errors(&a_events), vec!["Invalid message data"]);
    assert!(new_messages(&a_events).is_empty());
    assert!(new_messages(&b.drain()).is_empty(), "no fan-out on rejection");
    assert!(chat.store.is_empty(&IssueId::new("issue-7")), "no log entry");
}

#[tokio::test]
async fn test_disallowed_role_is_rejected() {
    let chat = TestChat::new();
    let mut a = chat.connect();
    chat.send(&a, join("issue-7", "user-a")).await;
    a.drain();

    chat.send(&a, send_text("issue-7", "user-a", "admin", "hi"))
        .await;

    assert_eq!(errors(&a.drain()), vec!["Invalid sender role"]);
    assert!(chat.store.is_empty(&IssueId::new("issue-7")));
}

#[tokio::test]
async fn test_sender_cannot_read_own_message() {
    let chat = TestChat::new();
    let mut a = chat.connect();
    let mut b = chat.connect();
    chat.send(&a, join("issue-9", "user-a")).await;
    chat.send(&b, join("issue-9", "user-b")).await;
    chat.send(&a, send_text("issue-9", "user-a", "student", "hi"))
        .await;

    let message_id = a
        .drain()
        .iter()
        .find_map(|event| match event {
            OutboundEvent::MessageSent { message_id, .. } => Some(message_id.clone()),
            _ => None,
        })
        .expect("message_sent was not emitted");
    b.drain();

    chat.send(
        &a,
        InboundEvent::MarkMessageRead {
            issue_id: IssueId::new("issue-9"),
            message_id: message_id.clone(),
            reader_id: UserId::new("user-a"),
        },
    )
    .await;

    assert!(a.drain().is_empty(), "self-read is a silent no-op");
    assert!(b.drain().is_empty());

    let stored = chat
        .store
        .get(&IssueId::new("issue-9"), &message_id)
        .await
        .unwrap()
        .expect("message must still exist");
    assert!(!stored.read);
    assert!(stored.read_at.is_none());
}

#[tokio::test]
async fn test_marking_read_twice_keeps_the_first_read_time() {
    let chat = TestChat::new();
    let mut a = chat.connect();
    let mut b = chat.connect();
    chat.send(&a, join("issue-5", "user-a")).await;
    chat.send(&b, join("issue-5", "user-b")).await;
    chat.send(&b, send_text("issue-5", "user-b", "worker", "ping"))
        .await;

    let message_id = b
        .drain()
        .iter()
        .find_map(|event| match event {
            OutboundEvent::MessageSent { message_id, .. } => Some(message_id.clone()),
            _ => None,
        })
        .expect("message_sent was not emitted");
    a.drain();

    let mark = InboundEvent::MarkMessageRead {
        issue_id: IssueId::new("issue-5"),
        message_id: message_id.clone(),
        reader_id: UserId::new("user-a"),
    };

    chat.send(&a, mark.clone()).await;
    let first_read_at = b
        .drain()
        .iter()
        .find_map(|event| match event {
            OutboundEvent::MessageRead { read_at, .. } => Some(*read_at),
            _ => None,
        })
        .expect("message_read was not emitted");

    chat.send(&a, mark).await;
    let second_read_at = b
        .drain()
        .iter()
        .find_map(|event| match event {
            OutboundEvent::MessageRead { read_at, .. } => Some(*read_at),
            _ => None,
        })
        .expect("repeat message_read was not emitted");

    assert_eq!(first_read_at, second_read_at);

    let stored = chat
        .store
        .get(&IssueId::new("issue-5"), &message_id)
        .await
        .unwrap()
        .expect("message must exist");
    assert_eq!(stored.read_at, Some(first_read_at));
}

#[tokio::test]
async fn test_offline_broadcast_waits_for_last_session() {
    let chat = TestChat::new();
    let mut observer = chat.connect();
    chat.send(
        &observer,
        InboundEvent::RegisterUser {
            user_id: UserId::new("watcher"),
        },
    )
    .await;

    let s1 = chat.connect();
    let s2 = chat.connect();
    chat.send(
        &s1,
        InboundEvent::RegisterUser {
            user_id: UserId::new("user-a"),
        },
    )
    .await;
    chat.send(
        &s2,
        InboundEvent::RegisterUser {
            user_id: UserId::new("user-a"),
        },
    )
    .await;
    observer.drain();

    chat.disconnect(&s1);
    assert!(
        !observer
            .drain()
            .iter()
            .any(|event| matches!(event, OutboundEvent::UserOffline { .. })),
        "user still has a live session"
    );

    chat.disconnect(&s2);
    assert!(observer.drain().iter().any(|event| matches!(
        event,
        OutboundEvent::UserOffline { user_id, .. } if user_id == &UserId::new("user-a")
    )));
}

#[tokio::test]
async fn test_history_and_unread_counts() {
    let chat = TestChat::new();
    let mut a = chat.connect();
    let mut b = chat.connect();
    chat.send(&b, join("issue-3", "user-b")).await;
    chat.send(&a, join("issue-3", "user-a")).await;
    chat.send(&b, send_text("issue-3", "user-b", "worker", "first"))
        .await;
    chat.send(&b, send_text("issue-3", "user-b", "worker", "second"))
        .await;
    a.drain();
    b.drain();

    chat.send(
        &a,
        InboundEvent::GetChatHistory {
            issue_id: IssueId::new("issue-3"),
            since: None,
        },
    )
    .await;
    let events = a.drain();
    let history = events
        .iter()
        .find_map(|event| match event {
            OutboundEvent::ChatHistory { messages, .. } => Some(messages.clone()),
            _ => None,
        })
        .expect("chat_history was not emitted");
    assert_eq!(
        history.iter().map(|m| m.text.as_str()).collect::<Vec<_>>(),
        vec!["first", "second"]
    );

    let unread = InboundEvent::GetUnreadCount {
        issue_id: IssueId::new("issue-3"),
        user_id: UserId::new("user-a"),
    };

    chat.send(&a, unread.clone()).await;
    let events = a.drain();
    assert!(events
        .iter()
        .any(|event| matches!(event, OutboundEvent::UnreadCount { count: 2, .. })));

    chat.send(
        &a,
        InboundEvent::MarkMessageRead {
            issue_id: IssueId::new("issue-3"),
            message_id: history[0].id.clone(),
            reader_id: UserId::new("user-a"),
        },
    )
    .await;
    a.drain();
    b.drain();

    chat.send(&a, unread).await;
    let events = a.drain();
    assert!(events
        .iter()
        .any(|event| matches!(event, OutboundEvent::UnreadCount { count: 1, .. })));
}

#[tokio::test]
async fn test_blank_issue_id_join_is_rejected() {
    let chat = TestChat::new();
    let mut a = chat.connect();

    chat.send(
        &a,
        InboundEvent::JoinIssue {
            issue_id: IssueId::new(""),
            user_id: Some(UserId::new("user-a")),
        },
    )
    .await;

    assert_eq!(errors(&a.drain()), vec!["Issue ID is required"]);
}

#[tokio::test]
async fn test_typing_indicator_skips_the_typist() {
    let chat = TestChat::new();
    let mut a = chat.connect();
    let mut b = chat.connect();
    chat.send(&a, join("issue-4", "user-a")).await;
    chat.send(&b, join("issue-4", "user-b")).await;
    a.drain();
    b.drain();

    chat.send(
        &a,
        InboundEvent::TypingStart {
            issue_id: IssueId::new("issue-4"),
            sender_id: UserId::new("user-a"),
            sender_role: Some("student".to_string()),
        },
    )
    .await;

    assert!(b.drain().iter().any(|event| matches!(
        event,
        OutboundEvent::UserTyping { is_typing: true, sender_id, .. }
            if sender_id == &UserId::new("user-a")
    )));
    assert!(
        !a.drain()
            .iter()
            .any(|event| matches!(event, OutboundEvent::UserTyping { .. })),
        "typist must not hear their own indicator"
    );
}

#[tokio::test]
async fn test_unparseable_frame_gets_scoped_error() {
    let chat = TestChat::new();
    let mut a = chat.connect();
    let mut b = chat.connect();

    chat.engine
        .router
        .handle_raw(&a.handle.id, "this is not json")
        .await;

    assert_eq!(errors(&a.drain()), vec!["Invalid event payload"]);
    assert!(b.drain().is_empty(), "errors are scoped to the offender");
}
