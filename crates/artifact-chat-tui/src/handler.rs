use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Margin, Rect};
use crate::app::App;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Timer(timer) => app.handle_timer(timer),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.should_quit = true,
            KeyCode::Char('s') => app.export_artifact(),
            _ => {}
        }
        return;
    }

    if app.state().command_menu_visible {
        handle_menu_key(app, key);
    } else {
        handle_compose_key(app, key);
    }
}

/// Keys while the command menu is open. Enter picks the highlighted entry
/// and never submits the typed text.
fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.dismiss_menu(),
        KeyCode::Down => app.menu_nav_down(),
        KeyCode::Up => app.menu_nav_up(),
        KeyCode::Enter | KeyCode::Tab => app.select_highlighted(),
        _ => handle_editing_key(app, key),
    }
}

fn handle_compose_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit(),
        KeyCode::Esc => {
            if app.state().right_panel_visible() {
                app.close_panel();
            }
        }
        KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::PageUp => app.scroll_panel_up(10),
        KeyCode::PageDown => app.scroll_panel_down(10),
        _ => handle_editing_key(app, key),
    }
}

fn handle_editing_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let inside = |area: Option<Rect>| area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if app.state().command_menu_visible {
                if let Some(menu) = app.menu_area.filter(|r| point_in_rect(x, y, *r)) {
                    // Border and title rows select nothing
                    let rows = menu.inner(Margin::new(1, 1));
                    if point_in_rect(x, y, rows) {
                        let index = (y - rows.y) as usize + app.menu_state.offset();
                        if let Some(&id) = app.menu_commands().get(index) {
                            app.select_command(id);
                        }
                    }
                    return;
                }
                if !inside(app.input_area) {
                    app.dismiss_menu();
                }
            }

            if inside(app.close_area) {
                app.close_panel();
            }
        }
        MouseEventKind::ScrollDown => {
            if inside(app.panel_area) {
                app.scroll_panel_down(3);
            } else if inside(app.chat_area) {
                app.scroll_chat_down(3);
            }
        }
        MouseEventKind::ScrollUp => {
            if inside(app.panel_area) {
                app.scroll_panel_up(3);
            } else if inside(app.chat_area) {
                app.scroll_chat_up(3);
            }
        }
        _ => {}
    }
}
