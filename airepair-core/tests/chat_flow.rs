//! Integration tests for the chat workflow transcript.

use airepair_core::chat::{
    ChatSession, MessageBody, Role, SolveKind, ACCEPTED_REPLY, ACCEPTED_TEXT, REGENERATE_TEXT,
    STOPPED_TEXT,
};
use airepair_core::types::SolveResponse;
use airepair_core::ApiError;

fn solved(explanation: &str, code: &str) -> SolveResponse {
    SolveResponse {
        explanation: Some(explanation.into()),
        fixed_code: Some(code.into()),
        history: Vec::new(),
    }
}

fn bodies(chat: &ChatSession) -> Vec<MessageBody> {
    chat.messages().iter().map(|m| m.body.clone()).collect()
}

#[test]
fn send_shows_code_and_thinking_then_reply() {
    let mut chat = ChatSession::new();
    let dispatch = chat.send("  print(1)\n", "Python").unwrap();
    assert_eq!(dispatch.request.code, "print(1)");
    assert_eq!(dispatch.request.src_lang, "Python");
    assert!(dispatch.request.bug_id.starts_with("web_session_"));
    assert!(!dispatch.request.bug_id.starts_with("web_session_retry_"));
    assert_eq!(dispatch.ticket.kind, SolveKind::Initial);
    assert_eq!(chat.pending(), 1);
    assert_eq!(bodies(&chat), vec![MessageBody::Code("print(1)".into()), MessageBody::Thinking]);

    let reply = chat.apply_solve(&dispatch.ticket, Ok(solved("Added parens", "print(1)")));
    assert_eq!(chat.pending(), 0);
    let message = chat.message(reply).unwrap();
    assert_eq!(message.role, Role::Agent);
    assert!(message.actions_visible);
    assert_eq!(
        message.body,
        MessageBody::Markdown(
            "**Explanation:**\nAdded parens\n\n**Fixed Code:**\n```python\nprint(1)\n```\n".into()
        )
    );
}

#[test]
fn missing_explanation_uses_default_text() {
    let mut chat = ChatSession::new();
    let dispatch = chat.send("x", "C++").unwrap();
    let reply = chat.apply_solve(
        &dispatch.ticket,
        Ok(SolveResponse { fixed_code: Some("y".into()), ..Default::default() }),
    );
    let MessageBody::Markdown(text) = &chat.message(reply).unwrap().body else {
        panic!("expected markdown reply");
    };
    assert!(text.starts_with("**Explanation:**\nI've fixed existing issues."));
    assert!(text.contains("```c++\ny\n```"));
}

#[test]
fn regenerate_twice_keeps_original_and_resends_captured_code() {
    let mut chat = ChatSession::new();
    let first = chat.send("buggy()", "Java").unwrap();
    let original = chat.apply_solve(&first.ticket, Ok(solved("first", "fixed()")));
    let original_before = chat.message(original).unwrap().clone();

    let a = chat.regenerate(original).unwrap();
    let b = chat.regenerate(original).unwrap();
    assert_eq!(a.request.code, "buggy()");
    assert_eq!(b.request.code, "buggy()");
    assert_eq!(a.request.src_lang, "Java");
    assert!(a.request.bug_id.starts_with("web_session_retry_"));
    assert_ne!(a.request.bug_id, b.request.bug_id);
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
    assert_eq!(a.ticket.kind, SolveKind::Regenerate);
    assert_eq!(chat.pending(), 2);

    // Responses may come back in either order.
    let reply_b = chat.apply_solve(&b.ticket, Ok(solved("second", "fixed2()")));
    let reply_a = chat.apply_solve(&a.ticket, Ok(solved("", "fixed3()")));
    assert_eq!(chat.pending(), 0);
    assert_eq!(chat.message(original), Some(&original_before));

    let MessageBody::Markdown(text_b) = &chat.message(reply_b).unwrap().body else {
        panic!("expected markdown reply");
    };
    assert_eq!(text_b, "**Regenerated Solution:**\n\nsecond\n\n```java\nfixed2()\n```");
    let MessageBody::Markdown(text_a) = &chat.message(reply_a).unwrap().body else {
        panic!("expected markdown reply");
    };
    assert!(text_a.contains("Here is another attempt."));

    let regenerate_requests = chat
        .messages()
        .iter()
        .filter(|m| m.body == MessageBody::Text(REGENERATE_TEXT.into()))
        .count();
    assert_eq!(regenerate_requests, 2);
}

#[test]
fn accept_hides_actions_and_replies() {
    let mut chat = ChatSession::new();
    let d = chat.send("x", "Python").unwrap();
    let reply = chat.apply_solve(&d.ticket, Ok(solved("e", "y")));

    assert!(chat.accept(reply));
    assert!(!chat.message(reply).unwrap().actions_visible);
    let tail: Vec<_> = bodies(&chat).into_iter().rev().take(2).collect();
    assert_eq!(
        tail,
        vec![MessageBody::Markdown(ACCEPTED_REPLY.into()), MessageBody::Text(ACCEPTED_TEXT.into())]
    );

    // Actions are gone, so nothing else can be triggered from this message.
    assert!(!chat.accept(reply));
    assert!(!chat.stop(reply));
    assert!(chat.regenerate(reply).is_none());
}

#[test]
fn stop_hides_actions_without_reply() {
    let mut chat = ChatSession::new();
    let d = chat.send("x", "Python").unwrap();
    let reply = chat.apply_solve(&d.ticket, Ok(solved("e", "y")));
    let len = chat.messages().len();

    assert!(chat.stop(reply));
    assert_eq!(chat.messages().len(), len + 1);
    assert_eq!(chat.messages().last().unwrap().body, MessageBody::Text(STOPPED_TEXT.into()));
    assert!(!chat.message(reply).unwrap().actions_visible);
}

#[test]
fn error_replaces_thinking_with_error_bubble() {
    let mut chat = ChatSession::new();
    let d = chat.send("x", "Python").unwrap();
    let err = ApiError::Service {
        status: 500,
        message: "solver crashed".into(),
        detail: Some("solver crashed".into()),
    };
    let reply = chat.apply_solve(&d.ticket, Err(err));
    let message = chat.message(reply).unwrap();
    assert_eq!(message.body, MessageBody::Markdown("Error: solver crashed".into()));
    assert!(!message.actions_visible);
    assert_eq!(chat.pending(), 0);

    let d = chat.send("x", "Python").unwrap();
    let reply = chat.apply_solve(&d.ticket, Err(ApiError::Network(String::new())));
    assert_eq!(
        chat.message(reply).unwrap().body,
        MessageBody::Markdown("Error: Something went wrong.".into())
    );
}

#[test]
fn error_bubble_shows_only_the_service_detail() {
    let mut chat = ChatSession::new();
    let d = chat.send("x", "Python").unwrap();
    // The status line would fall back to `error`; the transcript does not.
    let err = ApiError::Service { status: 500, message: "solver offline".into(), detail: None };
    let reply = chat.apply_solve(&d.ticket, Err(err));
    assert_eq!(
        chat.message(reply).unwrap().body,
        MessageBody::Markdown("Error: Something went wrong.".into())
    );

    let d = chat.send("x", "Python").unwrap();
    let reply = chat.apply_solve(&d.ticket, Err(ApiError::Network("connection refused".into())));
    assert_eq!(
        chat.message(reply).unwrap().body,
        MessageBody::Markdown("Error: connection refused".into())
    );
}

#[test]
fn user_messages_offer_no_actions() {
    let mut chat = ChatSession::new();
    chat.send("x", "Python").unwrap();
    let user = chat.messages()[0].id;
    assert!(!chat.accept(user));
    assert!(chat.regenerate(user).is_none());
}
