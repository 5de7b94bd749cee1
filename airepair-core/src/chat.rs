//! Chat workflow: paste code, get fixed code plus an explanation.
//!
//! The transcript is append-only apart from two mutations: a thinking bubble is
//! removed once its response arrives, and a bubble's actions are hidden when
//! the user accepts or stops on it. Regenerating never touches the bubble it
//! was triggered from.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use crate::error::ApiError;
use crate::types::{SolveRequest, SolveResponse};

pub const ACCEPTED_TEXT: &str = "✅ Solution Accepted!";
pub const ACCEPTED_REPLY: &str = "Great! Let me know if you have any other code to fix.";
pub const STOPPED_TEXT: &str = "⛔ flow stopped.";
pub const REGENERATE_TEXT: &str = "🔄 Regenerate, please.";

/// Languages offered by the chat language selector.
pub const LANGUAGES: [&str; 4] = ["Python", "Java", "C++", "JavaScript"];

const SESSION_PREFIX: &str = "web_session_";
const RETRY_PREFIX: &str = "web_session_retry_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// Code pasted by the user, shown verbatim.
    Code(String),
    /// Plain text.
    Text(String),
    /// Agent reply rendered as Markdown.
    Markdown(String),
    /// Placeholder shown while a request is in flight.
    Thinking,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub body: MessageBody,
    /// Whether Accept / Regenerate / Stop are offered on this message.
    pub actions_visible: bool,
    /// Language of the fenced code in this message, for highlighting.
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveKind {
    Initial,
    Regenerate,
}

/// Correlates an in-flight solve request with its thinking bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveTicket {
    pub thinking_id: MessageId,
    pub kind: SolveKind,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveDispatch {
    pub ticket: SolveTicket,
    pub request: SolveRequest,
}

/// Hands out timestamp-based bug ids that never repeat within a session.
#[derive(Debug, Default)]
struct BugIdClock {
    last_millis: u128,
}

impl BugIdClock {
    fn next(&mut self, prefix: &str) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        self.last_millis = now.max(self.last_millis + 1);
        format!("{prefix}{}", self.last_millis)
    }
}

/// Owner of the chat transcript and the code captured for regeneration.
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    next_id: u64,
    last_code: String,
    last_lang: String,
    clock: BugIdClock,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn message(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Number of thinking bubbles still waiting for a response.
    pub fn pending(&self) -> usize {
        self.messages.iter().filter(|m| m.body == MessageBody::Thinking).count()
    }

    /// Sends pasted code. Blank input is ignored.
    pub fn send(&mut self, code: &str, language: &str) -> Option<SolveDispatch> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        self.last_code = code.to_owned();
        self.last_lang = language.to_owned();

        self.push(Role::User, MessageBody::Code(code.to_owned()), Some(language.to_owned()));
        Some(self.dispatch(SolveKind::Initial))
    }

    /// Offers a solve response; replaces the ticket's thinking bubble with the reply.
    pub fn apply_solve(&mut self, ticket: &SolveTicket, outcome: Result<SolveResponse, ApiError>) -> MessageId {
        self.messages.retain(|m| m.id != ticket.thinking_id);

        match outcome {
            Ok(data) => {
                let fence = ticket.language.to_lowercase();
                let fixed = data.fixed_code.unwrap_or_default();
                let explanation = data.explanation.filter(|e| !e.is_empty());
                let markdown = match ticket.kind {
                    SolveKind::Initial => format!(
                        "**Explanation:**\n{}\n\n**Fixed Code:**\n```{fence}\n{fixed}\n```\n",
                        explanation.as_deref().unwrap_or("I've fixed existing issues.")
                    ),
                    SolveKind::Regenerate => format!(
                        "**Regenerated Solution:**\n\n{}\n\n```{fence}\n{fixed}\n```",
                        explanation.as_deref().unwrap_or("Here is another attempt.")
                    ),
                };
                let id = self.push(Role::Agent, MessageBody::Markdown(markdown), Some(ticket.language.clone()));
                if let Some(message) = self.messages.last_mut() {
                    message.actions_visible = true;
                }
                id
            }
            Err(e) => {
                let detail = e.reported_detail().unwrap_or("Something went wrong.");
                self.push(Role::Agent, MessageBody::Markdown(format!("Error: {detail}")), None)
            }
        }
    }

    /// Accepts the solution in message `id`. Returns false if it offers no actions.
    pub fn accept(&mut self, id: MessageId) -> bool {
        if !self.hide_actions(id) {
            return false;
        }
        info!(message = id.0, "chat solution accepted");
        self.push(Role::User, MessageBody::Text(ACCEPTED_TEXT.to_owned()), None);
        self.push(Role::Agent, MessageBody::Markdown(ACCEPTED_REPLY.to_owned()), None);
        true
    }

    /// Stops the flow on message `id`. Returns false if it offers no actions.
    pub fn stop(&mut self, id: MessageId) -> bool {
        if !self.hide_actions(id) {
            return false;
        }
        self.push(Role::User, MessageBody::Text(STOPPED_TEXT.to_owned()), None);
        true
    }

    /// Asks for another attempt at the code captured on the last send.
    ///
    /// The triggering message is left as it is. Returns `None` when `id` offers
    /// no actions or nothing has been sent yet.
    pub fn regenerate(&mut self, id: MessageId) -> Option<SolveDispatch> {
        if !self.message(id).is_some_and(|m| m.actions_visible) {
            return None;
        }
        self.push(Role::User, MessageBody::Text(REGENERATE_TEXT.to_owned()), None);
        if self.last_code.is_empty() {
            return None;
        }
        Some(self.dispatch(SolveKind::Regenerate))
    }

    fn dispatch(&mut self, kind: SolveKind) -> SolveDispatch {
        let prefix = match kind {
            SolveKind::Initial => SESSION_PREFIX,
            SolveKind::Regenerate => RETRY_PREFIX,
        };
        let bug_id = self.clock.next(prefix);
        let thinking_id = self.push(Role::Agent, MessageBody::Thinking, None);
        debug!(%bug_id, ?kind, "solve request issued");

        SolveDispatch {
            ticket: SolveTicket { thinking_id, kind, language: self.last_lang.clone() },
            request: SolveRequest {
                code: self.last_code.clone(),
                src_lang: self.last_lang.clone(),
                bug_id,
            },
        }
    }

    fn push(&mut self, role: Role, body: MessageBody, language: Option<String>) -> MessageId {
        self.next_id += 1;
        let id = MessageId(self.next_id);
        self.messages.push(ChatMessage { id, role, body, actions_visible: false, language });
        id
    }

    fn hide_actions(&mut self, id: MessageId) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id && m.actions_visible) {
            Some(message) => {
                message.actions_visible = false;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bug_ids_strictly_increase() {
        let mut clock = BugIdClock::default();
        let a = clock.next(SESSION_PREFIX);
        let b = clock.next(SESSION_PREFIX);
        let parse = |s: &str| s.trim_start_matches(SESSION_PREFIX).parse::<u128>().unwrap();
        assert!(parse(&b) > parse(&a));
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut chat = ChatSession::new();
        assert_eq!(chat.send("   \n", "Python"), None);
        assert!(chat.messages().is_empty());
    }
}
