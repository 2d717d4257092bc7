use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::command::CommandId;
use crate::config::Config;
use crate::scheduler::{Scheduler, TaskId, VirtualClock};
use crate::state::SessionState;
use crate::transition::{Effect, Event, Timer};

/// Simulated latencies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub reply_delay: Duration,
    pub artifact_delay: Duration,
}

impl Timings {
    pub fn delay_for(&self, timer: &Timer) -> Duration {
        match timer {
            Timer::Reply { .. } => self.reply_delay,
            Timer::ArtifactReady { .. } => self.artifact_delay,
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(1000),
            artifact_delay: Duration::from_millis(2000),
        }
    }
}

impl From<&Config> for Timings {
    fn from(config: &Config) -> Self {
        Self {
            reply_delay: Duration::from_millis(config.reply_delay_ms),
            artifact_delay: Duration::from_millis(config.artifact_delay_ms),
        }
    }
}

/// Owns the session state and carries out the effects of its transitions
pub struct ChatSession<S: Scheduler> {
    state: SessionState,
    scheduler: S,
    timings: Timings,
    // request id -> scheduled generation, so superseded ones can be cancelled
    artifact_tasks: HashMap<u64, TaskId>,
}

impl<S: Scheduler> ChatSession<S> {
    pub fn new(state: SessionState, scheduler: S, timings: Timings) -> Self {
        Self {
            state,
            scheduler,
            timings,
            artifact_tasks: HashMap::new(),
        }
    }

    /// Session configured from `config`, greeting included
    pub fn from_config(config: &Config, scheduler: S) -> Self {
        let mut state = SessionState::new();
        if let Some(greeting) = config.greeting.as_deref() {
            state = state.with_greeting(greeting, scheduler.timestamp());
        }
        Self::new(state, scheduler, Timings::from(config))
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn handle(&mut self, event: Event) {
        if let Event::Timer(Timer::ArtifactReady { request, .. }) = &event {
            self.artifact_tasks.remove(request);
        }

        let now = self.scheduler.timestamp();
        let effects = self.state.apply(event, now);
        for effect in effects {
            self.run(effect);
        }
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::Schedule(timer) => {
                let delay = self.timings.delay_for(&timer);
                let request = match &timer {
                    Timer::ArtifactReady { request, .. } => Some(*request),
                    Timer::Reply { .. } => None,
                };
                let task = self.scheduler.schedule(delay, timer);
                debug!(task = task.0, delay_ms = delay.as_millis() as u64, "scheduled timer");
                if let Some(request) = request {
                    self.artifact_tasks.insert(request, task);
                }
            }
            Effect::CancelArtifact { request } => {
                if let Some(task) = self.artifact_tasks.remove(&request) {
                    let cancelled = self.scheduler.cancel(task);
                    debug!(request, cancelled, "cancelled artifact generation");
                }
            }
        }
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.handle(Event::InputChanged(text.into()));
    }

    pub fn submit(&mut self) {
        self.handle(Event::Submit);
    }

    pub fn dispatch(&mut self, content: impl Into<String>) {
        self.handle(Event::Dispatch(content.into()));
    }

    pub fn select_command(&mut self, id: CommandId) {
        self.handle(Event::SelectCommand(id));
    }

    pub fn pointer_outside(&mut self) {
        self.handle(Event::PointerOutside);
    }

    pub fn close_panel(&mut self) {
        self.handle(Event::ClosePanel);
    }

    /// Number of artifact generations still waiting on the scheduler
    pub fn pending_artifacts(&self) -> usize {
        self.artifact_tasks.len()
    }
}

impl ChatSession<VirtualClock> {
    /// Session on a fresh virtual clock with default timings and no greeting
    pub fn virtual_time() -> Self {
        Self::new(SessionState::new(), VirtualClock::new(), Timings::default())
    }

    /// Advance virtual time, handling every timer that falls due on the way,
    /// including timers scheduled by earlier ones.
    pub fn advance(&mut self, by: Duration) {
        let until = self.scheduler.now() + by;
        while let Some(timer) = self.scheduler.pop_due(until) {
            self.handle(Event::Timer(timer));
        }
        self.scheduler.settle(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactContent, ArtifactKind, ArtifactLibrary};
    use crate::state::{Panel, Sender};

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_dispatch_then_reply_after_delay() {
        let mut session = ChatSession::virtual_time();
        session.dispatch("hello");
        assert_eq!(session.state().messages.len(), 1);

        session.advance(ms(999));
        assert_eq!(session.state().messages.len(), 1);

        session.advance(ms(1));
        let messages = &session.state().messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[1].sender, Sender::Assistant);
        assert_eq!(messages[1].content, "I've processed your request: \"hello\"");
        assert_eq!(session.state().panel, Panel::Closed);
    }

    #[test]
    fn test_blank_dispatch_schedules_nothing() {
        let mut session = ChatSession::virtual_time();
        session.dispatch("");
        session.dispatch("   ");
        assert_eq!(session.scheduler().pending_count(), 0);
        session.advance(ms(10_000));
        assert!(session.state().messages.is_empty());
    }

    #[test]
    fn test_react_component_scenario() {
        let mut session = ChatSession::virtual_time();
        session.set_input("Generate a React component");
        session.submit();

        let user = &session.state().messages[0];
        assert_eq!(user.sender, Sender::User);
        assert!(user.has_artifact);
        assert_eq!(session.state().panel, Panel::Closed);

        session.advance(ms(1000));
        assert_eq!(session.state().messages.len(), 2);
        assert_eq!(
            session.state().messages[1].content,
            "I've processed your request: \"Generate a React component\""
        );
        assert!(session.state().is_generating());
        assert!(session.state().right_panel_visible());
        assert!(session.state().current_artifact().is_none());

        session.advance(ms(1999));
        assert!(session.state().is_generating());

        session.advance(ms(1));
        let artifact = session.state().current_artifact().expect("artifact shown");
        assert_eq!(artifact.kind(), ArtifactKind::Code);
        assert_eq!(artifact.title, "React Button Component");
        assert!(!session.state().is_generating());
        assert_eq!(session.pending_artifacts(), 0);
    }

    #[test]
    fn test_advance_handles_chained_timers() {
        let mut session = ChatSession::virtual_time();
        session.dispatch("Generate an image of a landscape");
        session.advance(ms(3000));
        assert_eq!(
            session.state().current_artifact().map(|a| a.kind()),
            Some(ArtifactKind::Image)
        );
    }

    #[test]
    fn test_each_classification() {
        for (content, expected) in [
            ("Generate a React component", Some(ArtifactKind::Code)),
            ("Generate an image of a landscape", Some(ArtifactKind::Image)),
            ("Create a document about AI", Some(ArtifactKind::Text)),
            ("generate xyz", None),
        ] {
            let mut session = ChatSession::virtual_time();
            session.dispatch(content);
            session.advance(ms(3000));
            assert_eq!(
                session.state().current_artifact().map(|a| a.kind()),
                expected,
                "{}",
                content
            );
            assert!(session.state().right_panel_visible());
        }
    }

    #[test]
    fn test_clear_command_from_any_state() {
        let mut session = ChatSession::virtual_time();
        session.dispatch("Create a document about AI");
        session.advance(ms(3000));
        assert!(session.state().current_artifact().is_some());

        session.set_input("/");
        session.select_command(CommandId::Clear);
        assert!(session.state().messages.is_empty());
        assert_eq!(session.state().panel, Panel::Closed);
        assert!(session.state().input.is_empty());
        assert!(!session.state().command_menu_visible);
    }

    #[test]
    fn test_clear_drops_inflight_reply_and_generation() {
        let mut session = ChatSession::virtual_time();
        session.dispatch("Generate a React component");
        session.advance(ms(1500));
        assert!(session.state().is_generating());

        session.dispatch("Create a document about AI");
        session.select_command(CommandId::Clear);
        assert_eq!(session.pending_artifacts(), 0);

        session.advance(ms(10_000));
        assert!(session.state().messages.is_empty());
        assert_eq!(session.state().panel, Panel::Closed);
    }

    #[test]
    fn test_newer_request_supersedes_pending() {
        let mut session = ChatSession::virtual_time();
        session.dispatch("Generate a React component");
        session.advance(ms(500));
        session.dispatch("Create a document about AI");

        // first reply at 1000 starts the code generation, second at 1500 replaces it
        session.advance(ms(1000));
        assert!(session.state().is_generating());
        assert_eq!(session.pending_artifacts(), 1);

        session.advance(ms(5000));
        assert_eq!(
            session.state().current_artifact().map(|a| a.kind()),
            Some(ArtifactKind::Text)
        );
        assert_eq!(session.scheduler().pending_count(), 0);
    }

    #[test]
    fn test_reopen_starts_from_loading() {
        let mut session = ChatSession::virtual_time();
        session.dispatch("Generate a React component");
        session.advance(ms(3000));
        session.close_panel();
        assert_eq!(session.state().panel, Panel::Closed);
        session.close_panel();
        assert_eq!(session.state().panel, Panel::Closed);

        session.dispatch("Generate a React component");
        session.advance(ms(1000));
        assert!(session.state().is_generating());
        assert!(session.state().current_artifact().is_none());
    }

    #[test]
    fn test_close_while_loading_cancels_generation() {
        let mut session = ChatSession::virtual_time();
        session.dispatch("Generate a React component");
        session.advance(ms(1000));
        session.close_panel();
        assert_eq!(session.scheduler().pending_count(), 0);
        session.advance(ms(5000));
        assert_eq!(session.state().panel, Panel::Closed);
    }

    #[test]
    fn test_pointer_outside_keeps_text() {
        let mut session = ChatSession::virtual_time();
        session.set_input("/");
        session.pointer_outside();
        assert!(!session.state().command_menu_visible);
        assert_eq!(session.state().input, "/");
    }

    #[test]
    fn test_custom_library() {
        let library = ArtifactLibrary::empty().with(
            "Hello",
            ArtifactContent::Code {
                language: "rs".into(),
                source: "fn main() {}".into(),
            },
        );
        let mut session = ChatSession::new(
            SessionState::with_library(library),
            VirtualClock::new(),
            Timings {
                reply_delay: ms(10),
                artifact_delay: ms(20),
            },
        );
        session.dispatch("write some code");
        session.advance(ms(30));
        assert_eq!(session.state().current_artifact().map(|a| a.title.as_str()), Some("Hello"));

        // kinds missing from the library end up empty
        session.dispatch("Generate an image");
        session.advance(ms(30));
        assert_eq!(session.state().panel, Panel::Empty);
    }

    #[test]
    fn test_from_config_greets() {
        let config = Config::default();
        let session = ChatSession::from_config(&config, VirtualClock::new());
        assert_eq!(session.state().messages.len(), 1);
        assert_eq!(
            session.state().messages[0].content,
            "Hello! Type / to see available commands."
        );
        assert_eq!(session.timings(), Timings::default());

        let config = Config {
            greeting: None,
            ..Config::default()
        };
        let session = ChatSession::from_config(&config, VirtualClock::new());
        assert!(session.state().messages.is_empty());
    }

    #[test]
    fn test_messages_are_stamped_in_virtual_time() {
        let origin = chrono::DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let mut session = ChatSession::new(
            SessionState::new(),
            VirtualClock::starting_at(origin),
            Timings::default(),
        );

        session.advance(ms(250));
        session.dispatch("hello");
        session.advance(ms(5000));

        let messages = &session.state().messages;
        assert_eq!(messages[0].timestamp, origin + chrono::Duration::milliseconds(250));
        assert_eq!(messages[1].timestamp, origin + chrono::Duration::milliseconds(1250));
    }
}
