//! Session Management
//!
//! Chat history for one front-end session. The history is passed around
//! explicitly by whoever owns the session; the agent never touches it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{Message, Role};

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chat session: questions asked and answers shown
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier
    pub id: SessionId,

    /// Displayed history (user and assistant messages only)
    history: Vec<Message>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a session whose history opens with an assistant greeting
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.history.push(Message::assistant(greeting));
        session
    }

    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Record a submitted question
    pub fn push_question(&mut self, question: impl Into<String>) {
        self.history.push(Message::user(question));
        self.touch();
    }

    /// Record an answer shown to the user
    pub fn push_answer(&mut self, answer: impl Into<String>) {
        self.history.push(Message::assistant(answer));
        self.touch();
    }

    /// Displayed history in order
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Number of questions asked in this session
    pub fn question_count(&self) -> usize {
        self.history.iter().filter(|m| m.role == Role::User).count()
    }

    /// Message count
    pub fn message_count(&self) -> usize {
        self.history.len()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
