//! Course-scoped AI chat: transcript plus single-flight request discipline.

pub mod completion;
pub mod prompt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use completion::{
    Completion, CompletionClient, CompletionError, HttpCompletionClient, RequestMessage,
    RequestRole, Usage,
};

/// How long a copied message stays marked as copied.
pub const COPIED_MARKER_SECS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl From<ChatRole> for RequestRole {
    fn from(role: ChatRole) -> Self {
        match role {
            ChatRole::User => RequestRole::User,
            ChatRole::Assistant => RequestRole::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Why a send was ignored. Neither case touches the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyInput,
    InFlight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Rejected(Rejection),
    /// The assistant reply was appended; carries its id.
    Replied(Uuid),
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CopiedMarker {
    id: Uuid,
    until: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    in_flight: bool,
    last_error: Option<String>,
    usage: Option<Usage>,
    #[serde(skip)]
    copied: Option<CopiedMarker>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn message(&self, id: Uuid) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn usage(&self) -> Option<Usage> {
        self.usage
    }

    /// Appends the user message and returns the request to dispatch:
    /// `directive` as a system message followed by the whole transcript.
    pub fn begin_send(
        &mut self,
        text: &str,
        directive: &str,
    ) -> Result<Vec<RequestMessage>, Rejection> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Rejection::EmptyInput);
        }
        if self.in_flight {
            return Err(Rejection::InFlight);
        }

        self.messages.push(ChatMessage::new(ChatRole::User, text));
        self.in_flight = true;
        self.last_error = None;

        let mut request = Vec::with_capacity(self.messages.len() + 1);
        request.push(RequestMessage::new(RequestRole::System, directive));
        request.extend(
            self.messages
                .iter()
                .map(|m| RequestMessage::new(m.role.into(), &m.content)),
        );
        Ok(request)
    }

    /// Applies the resolution of the request started by [`begin_send`].
    ///
    /// [`begin_send`]: ChatSession::begin_send
    pub fn finish_send(&mut self, result: Result<Completion, CompletionError>) -> SendOutcome {
        if !self.in_flight {
            log::warn!("Dropping a completion result with no request in flight");
            return SendOutcome::Rejected(Rejection::InFlight);
        }
        self.in_flight = false;

        match result {
            Ok(completion) if !completion.content.trim().is_empty() => {
                let reply = ChatMessage::new(ChatRole::Assistant, completion.content.trim());
                let id = reply.id;
                self.messages.push(reply);
                self.usage = completion.usage;
                SendOutcome::Replied(id)
            }
            Ok(_) => self.fail(CompletionError::EmptyReply),
            Err(err) => self.fail(err),
        }
    }

    /// Runs a full send: append, call the collaborator once, apply the result.
    pub async fn send(
        &mut self,
        client: &dyn CompletionClient,
        text: &str,
        directive: &str,
    ) -> SendOutcome {
        let request = match self.begin_send(text, directive) {
            Ok(request) => request,
            Err(rejection) => return SendOutcome::Rejected(rejection),
        };
        let result = client.complete(request).await;
        self.finish_send(result)
    }

    /// Empties the transcript and forgets error and usage. An outstanding
    /// request is not cancelled and still resolves into the cleared session.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.last_error = None;
        self.usage = None;
        self.copied = None;
    }

    /// Returns the content to copy and marks the message as copied for
    /// [`COPIED_MARKER_SECS`].
    pub fn copy(&mut self, id: Uuid, now: DateTime<Utc>) -> Option<String> {
        let content = self.message(id)?.content.clone();
        self.copied = Some(CopiedMarker {
            id,
            until: now + Duration::seconds(COPIED_MARKER_SECS),
        });
        Some(content)
    }

    pub fn copied_message(&self, now: DateTime<Utc>) -> Option<Uuid> {
        self.copied
            .filter(|marker| now < marker.until)
            .map(|marker| marker.id)
    }

    fn fail(&mut self, err: CompletionError) -> SendOutcome {
        log::error!("Chat completion failed: {}", err);
        self.last_error = Some(err.to_string());
        SendOutcome::Failed
    }
}
