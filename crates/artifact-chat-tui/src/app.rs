use std::path::PathBuf;
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use artifact_chat_core::command::matching;
use artifact_chat_core::{ChatSession, CommandId, Config, Event, SessionState, Timer};
use crate::tui::TokioScheduler;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    pub should_quit: bool,
    pub session: ChatSession<TokioScheduler>,

    // Input box
    pub input_cursor: usize, // cursor position in chars
    pub menu_state: ListState,

    // Chat scrolling
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of chat area for scroll calculations
    pub chat_width: u16,  // Inner width of chat area for wrap calculations

    // Artifact panel
    pub panel_scroll: u16,
    pub animation_frame: u8, // 0-2 for loading ellipsis

    // One-line feedback shown in the footer (e.g. download result)
    pub status: Option<String>,
    pub export_dir: PathBuf,

    // Areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub input_area: Option<Rect>,
    pub menu_area: Option<Rect>,
    pub panel_area: Option<Rect>,
    pub close_area: Option<Rect>,
}

impl App {
    pub fn new(config: &Config, scheduler: TokioScheduler) -> Self {
        Self {
            should_quit: false,
            session: ChatSession::from_config(config, scheduler),

            input_cursor: 0,
            menu_state: ListState::default(),

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            panel_scroll: 0,
            animation_frame: 0,

            status: None,
            export_dir: config.export_dir.clone().unwrap_or_else(|| PathBuf::from(".")),

            chat_area: None,
            input_area: None,
            menu_area: None,
            panel_area: None,
            close_area: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn input(&self) -> &str {
        &self.state().input
    }

    /// Commands listed in the open menu, narrowed by what follows the "/"
    pub fn menu_commands(&self) -> Vec<CommandId> {
        if self.state().command_menu_visible {
            matching(self.input())
        } else {
            Vec::new()
        }
    }

    pub fn selected_command(&self) -> Option<CommandId> {
        self.menu_state
            .selected()
            .and_then(|i| self.menu_commands().get(i).copied())
    }

    // Input editing
    fn set_input(&mut self, text: String, cursor: usize) {
        let was_open = self.state().command_menu_visible;
        self.session.handle(Event::InputChanged(text));
        self.input_cursor = cursor;
        self.status = None;

        let len = self.menu_commands().len();
        if !self.state().command_menu_visible || len == 0 {
            self.menu_state.select(None);
        } else if !was_open || self.menu_state.selected().map_or(true, |i| i >= len) {
            self.menu_state.select(Some(0));
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let mut text = self.input().to_string();
        let byte_pos = char_to_byte_index(&text, self.input_cursor);
        text.insert(byte_pos, c);
        self.set_input(text, self.input_cursor + 1);
    }

    pub fn backspace(&mut self) {
        if self.input_cursor > 0 {
            let mut text = self.input().to_string();
            let byte_pos = char_to_byte_index(&text, self.input_cursor - 1);
            text.remove(byte_pos);
            self.set_input(text, self.input_cursor - 1);
        }
    }

    pub fn delete(&mut self) {
        let char_count = self.input().chars().count();
        if self.input_cursor < char_count {
            let mut text = self.input().to_string();
            let byte_pos = char_to_byte_index(&text, self.input_cursor);
            text.remove(byte_pos);
            self.set_input(text, self.input_cursor);
        }
    }

    pub fn cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.input().chars().count();
        self.input_cursor = (self.input_cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.input_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.input_cursor = self.input().chars().count();
    }

    // Command menu
    pub fn menu_nav_down(&mut self) {
        let len = self.menu_commands().len();
        if len > 0 {
            let i = self.menu_state.selected().unwrap_or(0);
            self.menu_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn menu_nav_up(&mut self) {
        let i = self.menu_state.selected().unwrap_or(0);
        self.menu_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_highlighted(&mut self) {
        if let Some(id) = self.selected_command() {
            self.select_command(id);
        }
    }

    pub fn select_command(&mut self, id: CommandId) {
        self.session.select_command(id);
        self.after_send();
    }

    /// Same as clicking outside the input: close the menu, keep the text
    pub fn dismiss_menu(&mut self) {
        self.session.pointer_outside();
        self.menu_state.select(None);
    }

    pub fn submit(&mut self) {
        self.session.submit();
        if self.input().is_empty() {
            self.after_send();
        }
    }

    fn after_send(&mut self) {
        self.input_cursor = 0;
        self.menu_state.select(None);
        self.status = None;
        self.scroll_chat_to_bottom();
    }

    // Artifact panel
    pub fn close_panel(&mut self) {
        self.session.close_panel();
        self.panel_scroll = 0;
    }

    pub fn handle_timer(&mut self, timer: Timer) {
        if matches!(timer, Timer::ArtifactReady { .. }) {
            self.panel_scroll = 0;
        }
        self.session.handle(Event::Timer(timer));
        self.scroll_chat_to_bottom();
    }

    pub fn export_artifact(&mut self) {
        let result = match self.state().current_artifact() {
            Some(artifact) => artifact.export(&self.export_dir),
            None => {
                self.status = Some("Nothing to download".to_string());
                return;
            }
        };

        self.status = Some(match result {
            Ok(path) => {
                tracing::info!("exported artifact to {}", path.display());
                format!("Saved {}", path.display())
            }
            Err(e) => {
                tracing::warn!("artifact export failed: {:#}", e);
                e.to_string()
            }
        });
    }

    pub fn scroll_panel_down(&mut self, lines: u16) {
        self.panel_scroll = self.panel_scroll.saturating_add(lines);
    }

    pub fn scroll_panel_up(&mut self, lines: u16) {
        self.panel_scroll = self.panel_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let max = self.chat_line_count().saturating_sub(self.chat_height);
        self.chat_scroll = (self.chat_scroll.saturating_add(lines)).min(max);
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.state().is_generating() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Rendered line count of the chat, wrapping at the last known width
    fn chat_line_count(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for msg in &self.state().messages {
            total_lines = total_lines.saturating_add(1); // Sender line ("U" or "AI")
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                let wrapped = if char_count == 0 { 1 } else { char_count / wrap_width + 1 };
                total_lines = total_lines.saturating_add(wrapped as u16);
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }
        total_lines
    }

    /// Scroll chat so the newest message is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };
        self.chat_scroll = self.chat_line_count().saturating_sub(visible_height);
    }
}
