use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use artifact_chat_core::{Artifact, ArtifactContent, Panel, Sender};
use crate::app::App;

const CLOSE_LABEL: &str = "[Close]";

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        match after.find("**") {
            Some(end) if end > 0 => {
                if start > 0 {
                    spans.push(Span::raw(rest[..start].to_string()));
                }
                spans.push(Span::styled(
                    after[..end].to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                rest = &after[end + 2..];
            }
            // No closing **, treat as literal
            _ => break,
        }
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    // Headings
    if text.starts_with('#') {
        return Line::from(Span::styled(
            text.trim_start_matches('#').trim_start().to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);

    // Chat on the left, artifact panel on the right when open
    let (chat_column, panel_area) = if app.state().right_panel_visible() {
        let [chat, panel] = Layout::horizontal([
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .areas(body_area);
        (chat, Some(panel))
    } else {
        (body_area, None)
    };

    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(chat_column);

    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);

    match panel_area {
        Some(panel_area) => render_panel(app, frame, panel_area),
        None => {
            app.panel_area = None;
            app.close_area = None;
        }
    }

    // Menu last so it draws over the chat
    if app.state().command_menu_visible {
        render_command_menu(app, frame, input_area);
    } else {
        app.menu_area = None;
    }

    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Chat Interface ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = if app.state().command_menu_visible {
        vec![
            Span::styled(" ↑/↓ ", key_style),
            Span::styled(" choose ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" run ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" dismiss ", label_style),
        ]
    } else {
        let mut hints = vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" / ", key_style),
            Span::styled(" commands ", label_style),
        ];
        if app.state().right_panel_visible() {
            hints.extend(vec![
                Span::styled(" PgUp/PgDn ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" close ", label_style),
            ]);
        }
        if app.state().current_artifact().is_some() {
            hints.extend(vec![
                Span::styled(" ^S ", key_style),
                Span::styled(" download ", label_style),
            ]);
        }
        hints
    };
    hints.extend(vec![
        Span::styled(" ^C ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    if let Some(status) = &app.status {
        hints.push(Span::styled(
            format!("  {}", status),
            Style::default().bg(Color::Black).fg(Color::Yellow),
        ));
    }

    let footer = Paragraph::new(Line::from(hints)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store area for mouse hit-testing and inner size for scroll calculations
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Messages ({}) ", app.state().messages.len()));

    let chat_text = if app.state().messages.is_empty() {
        Text::from(Span::styled(
            "No messages yet.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in &app.state().messages {
            let label = match msg.sender {
                Sender::User => Span::styled(
                    "U",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Sender::Assistant => Span::styled(
                    "AI",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
            };
            let time = Span::styled(
                format!(" {}", msg.timestamp.with_timezone(&chrono::Local).format("%H:%M")),
                Style::default().fg(Color::DarkGray),
            );
            let label_line = Line::from(vec![label, time]);
            match msg.sender {
                Sender::User => lines.push(label_line.right_aligned()),
                Sender::Assistant => lines.push(label_line),
            }

            for line in msg.content.lines() {
                let line = Line::from(line.to_string());
                lines.push(match msg.sender {
                    Sender::User => line.right_aligned(),
                    Sender::Assistant => line,
                });
            }
            lines.push(Line::default());
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    app.input_area = Some(area);

    let border_color = if app.state().command_menu_visible {
        Color::Magenta
    } else {
        Color::Yellow
    };
    let send_hint = if app.state().can_send() { " Enter to send " } else { "" };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Message{}", if send_hint.is_empty() { " " } else { send_hint }));

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let input = if app.input().is_empty() {
        Paragraph::new("Type a message or / for commands...")
            .style(Style::default().fg(Color::DarkGray))
    } else {
        // Get the visible slice of the input
        let visible_text: String = app.input()
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(block), area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

fn render_command_menu(app: &mut App, frame: &mut Frame, input_area: Rect) {
    let commands = app.menu_commands();

    // Popup sits directly above the input box
    let rows = commands.len().max(1) as u16;
    let height = (rows + 2).min(input_area.y);
    if height < 3 {
        app.menu_area = None;
        return;
    }
    let menu_area = Rect::new(input_area.x, input_area.y - height, input_area.width, height);
    app.menu_area = Some(menu_area);

    // Clear the area behind the popup
    frame.render_widget(Clear, menu_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Available Commands ");

    if commands.is_empty() {
        let placeholder = Paragraph::new("No matching commands")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, menu_area);
        return;
    }

    let items: Vec<ListItem> = commands
        .iter()
        .map(|c| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<10}", c.name()), Style::default().bold()),
                Span::styled(c.description(), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, menu_area, &mut app.menu_state);
}

fn render_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    app.panel_area = Some(area);

    let title = match app.state().current_artifact() {
        Some(artifact) => format!(" {} ", artifact.title),
        None => " AI Response ".to_string(),
    };

    // Artifact type shown at the bottom, like a footer
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);
    if let Some(artifact) = app.state().current_artifact() {
        block = block.title_bottom(format!(" {} ", artifact.kind().display_name()));
    }

    let body = match &app.state().panel {
        Panel::Loading { .. } => {
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            Paragraph::new(Line::from(Span::styled(
                format!("Generating content{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )))
            .centered()
        }
        Panel::Showing(artifact) => artifact_body(artifact).scroll((app.panel_scroll, 0)),
        Panel::Empty | Panel::Closed => Paragraph::new("No content to display")
            .style(Style::default().fg(Color::DarkGray))
            .centered(),
    };

    frame.render_widget(body.block(block), area);

    // Close label over the top-right border
    let label_width = CLOSE_LABEL.len() as u16;
    if area.width > label_width + 2 {
        let close_area = Rect::new(area.x + area.width - label_width - 1, area.y, label_width, 1);
        app.close_area = Some(close_area);
        frame.render_widget(
            Paragraph::new(CLOSE_LABEL).style(Style::default().fg(Color::Red).bold()),
            close_area,
        );
    } else {
        app.close_area = None;
    }
}

fn artifact_body(artifact: &Artifact) -> Paragraph<'static> {
    match &artifact.content {
        ArtifactContent::Code { source, .. } => {
            let lines: Vec<Line> = source
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Green))))
                .collect();
            Paragraph::new(Text::from(lines))
        }
        ArtifactContent::Image { reference, alt } => Paragraph::new(Text::from(vec![
            Line::default(),
            Line::from(Span::styled(format!("[image] {}", alt), Style::default().bold())),
            Line::from(Span::styled(reference.clone(), Style::default().fg(Color::Blue).underlined())),
        ]))
        .centered(),
        ArtifactContent::Text { document } => {
            let lines: Vec<Line> = document.lines().map(parse_markdown_line).collect();
            Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false })
        }
    }
}
