//! Session state transitions
//!
//! [`SessionState::apply`] is the only place the session changes. It performs
//! no I/O and never reads a clock: delays come back as [`Effect`]s for the
//! caller to schedule, and the caller passes `now` for message timestamps.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::artifact::{classify, requests_artifact};
use crate::command::{CommandEffect, CommandId};
use crate::state::{Panel, Sender, SessionState};

/// Inputs to the session
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The input box now holds this text
    InputChanged(String),
    /// Submit key pressed
    Submit,
    /// A command menu entry was chosen
    SelectCommand(CommandId),
    /// Pointer interaction outside the input and menu
    PointerOutside,
    /// User closed the artifact panel
    ClosePanel,
    /// Send a message without going through the input box
    Dispatch(String),
    /// A scheduled delay elapsed
    Timer(Timer),
}

/// Delayed work the session asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timer {
    /// Assistant reply to a message sent in `conversation`
    Reply {
        conversation: u64,
        content: String,
        has_artifact: bool,
    },
    /// Artifact generation for `request` finished
    ArtifactReady { request: u64, content: String },
}

/// Side effects for the session owner to carry out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Schedule(Timer),
    /// Drop the pending generation for `request`
    CancelArtifact { request: u64 },
}

impl SessionState {
    pub fn apply(&mut self, event: Event, now: DateTime<Utc>) -> Vec<Effect> {
        let mut effects = Vec::new();

        match event {
            Event::InputChanged(text) => self.input_changed(text),
            Event::Submit => {
                if self.command_menu_visible {
                    debug!("submit ignored while command menu is open");
                } else {
                    let content = self.input.clone();
                    self.dispatch(content, now, &mut effects);
                }
            }
            Event::SelectCommand(id) => {
                debug!(command = id.name(), "executing command");
                match id.effect() {
                    CommandEffect::SendMessage(content) => self.dispatch(content, now, &mut effects),
                    CommandEffect::ClearConversation => self.clear(&mut effects),
                }
                self.input.clear();
                self.command_menu_visible = false;
            }
            Event::PointerOutside => self.command_menu_visible = false,
            Event::ClosePanel => self.close_panel(&mut effects),
            Event::Dispatch(content) => self.dispatch(content, now, &mut effects),
            Event::Timer(Timer::Reply {
                conversation,
                content,
                has_artifact,
            }) => {
                if conversation != self.conversation {
                    warn!(conversation, current = self.conversation, "dropping reply for cleared conversation");
                } else {
                    self.push_message(
                        format!("I've processed your request: \"{}\"", content),
                        Sender::Assistant,
                        false,
                        now,
                    );
                    if has_artifact {
                        self.start_generation(content, &mut effects);
                    }
                }
            }
            Event::Timer(Timer::ArtifactReady { request, content }) => {
                if self.pending_request() != Some(request) {
                    warn!(request, "dropping superseded artifact");
                } else {
                    self.panel = match classify(&content).and_then(|kind| self.library.build(kind, request)) {
                        Some(artifact) => {
                            debug!(request, kind = artifact.kind().as_str(), "artifact ready");
                            Panel::Showing(artifact)
                        }
                        None => {
                            debug!(request, "no artifact for request");
                            Panel::Empty
                        }
                    };
                }
            }
        }

        effects
    }

    fn input_changed(&mut self, text: String) {
        if text == "/" {
            self.command_menu_visible = true;
        } else if !text.starts_with('/') || text.contains(' ') {
            self.command_menu_visible = false;
        }
        self.input = text;
    }

    fn dispatch(&mut self, content: String, now: DateTime<Utc>, effects: &mut Vec<Effect>) {
        if content.trim().is_empty() {
            return;
        }

        let has_artifact = requests_artifact(&content);
        self.push_message(content.clone(), Sender::User, has_artifact, now);
        self.input.clear();
        self.command_menu_visible = false;

        effects.push(Effect::Schedule(Timer::Reply {
            conversation: self.conversation,
            content,
            has_artifact,
        }));
    }

    fn start_generation(&mut self, content: String, effects: &mut Vec<Effect>) {
        if let Some(stale) = self.pending_request() {
            effects.push(Effect::CancelArtifact { request: stale });
        }

        let request = self.allocate_request();
        self.panel = Panel::Loading { request };
        effects.push(Effect::Schedule(Timer::ArtifactReady { request, content }));
    }

    fn close_panel(&mut self, effects: &mut Vec<Effect>) {
        if let Some(request) = self.pending_request() {
            effects.push(Effect::CancelArtifact { request });
        }
        self.panel = Panel::Closed;
    }

    fn clear(&mut self, effects: &mut Vec<Effect>) {
        self.messages.clear();
        self.conversation += 1;
        self.close_panel(effects);
    }
}
