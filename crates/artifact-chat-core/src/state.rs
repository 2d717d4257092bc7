//! UI-agnostic session state types
//!
//! This module contains the data a renderer needs to draw the chat (messages,
//! input box, command menu, artifact panel). It doesn't depend on any specific
//! UI framework; the TUI only ever reads it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::artifact::{Artifact, ArtifactLibrary};

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// A chat message. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub has_artifact: bool,
}

/// Artifact side panel
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Panel {
    #[default]
    Closed,
    /// Generation in flight for the given request id
    Loading { request: u64 },
    Showing(Artifact),
    /// Open with nothing to show (classification miss)
    Empty,
}

/// Input box state as seen by the command menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composer {
    Idle,
    Composing,
    ComposingSlash,
}

pub struct SessionState {
    pub messages: Vec<Message>,
    pub input: String,
    pub command_menu_visible: bool,
    pub panel: Panel,

    // Bumped by /clear so replies scheduled for an older conversation are dropped
    pub(crate) conversation: u64,
    pub(crate) next_message: u64,
    pub(crate) next_request: u64,

    pub(crate) library: ArtifactLibrary,
}

impl SessionState {
    pub fn new() -> Self {
        Self::with_library(ArtifactLibrary::default())
    }

    /// Session whose artifacts come from `library` instead of the canned fixtures
    pub fn with_library(library: ArtifactLibrary) -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            command_menu_visible: false,
            panel: Panel::Closed,
            conversation: 0,
            next_message: 0,
            next_request: 0,
            library,
        }
    }

    /// Start the conversation with an assistant greeting
    pub fn with_greeting(mut self, greeting: &str, now: DateTime<Utc>) -> Self {
        self.push_message(greeting.to_string(), Sender::Assistant, false, now);
        self
    }

    pub fn right_panel_visible(&self) -> bool {
        !matches!(self.panel, Panel::Closed)
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.panel, Panel::Loading { .. })
    }

    pub fn current_artifact(&self) -> Option<&Artifact> {
        match &self.panel {
            Panel::Showing(artifact) => Some(artifact),
            _ => None,
        }
    }

    /// Request id of the generation currently in flight, if any
    pub fn pending_request(&self) -> Option<u64> {
        match self.panel {
            Panel::Loading { request } => Some(request),
            _ => None,
        }
    }

    pub fn composer(&self) -> Composer {
        if self.command_menu_visible {
            Composer::ComposingSlash
        } else if self.input.is_empty() {
            Composer::Idle
        } else {
            Composer::Composing
        }
    }

    /// Whether submitting right now would send a message
    pub fn can_send(&self) -> bool {
        !self.command_menu_visible && !self.input.trim().is_empty()
    }

    pub(crate) fn push_message(
        &mut self,
        content: String,
        sender: Sender,
        has_artifact: bool,
        now: DateTime<Utc>,
    ) {
        self.next_message += 1;
        self.messages.push(Message {
            id: format!("msg-{}", self.next_message),
            content,
            sender,
            timestamp: now,
            has_artifact,
        });
    }

    pub(crate) fn allocate_request(&mut self) -> u64 {
        self.next_request += 1;
        self.next_request
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
