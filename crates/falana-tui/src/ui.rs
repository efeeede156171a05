use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use falana_core::Role;
use crate::app::{App, FocusPane, InputMode};

const PRODUCT_NAME: &str = "Falana AI";

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        match after_open.find("**") {
            Some(close) if close > 0 => {
                if open > 0 {
                    spans.push(Span::raw(rest[..open].to_string()));
                }
                spans.push(Span::styled(
                    after_open[..close].to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                rest = &after_open[close + 2..];
            }
            // No closing ** (or an empty pair), treat the rest as literal
            _ => break,
        }
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

fn thinking_text(frame: u8) -> String {
    // Animated ellipsis: cycles through ".", "..", "..."
    format!("{} is thinking{}", PRODUCT_NAME, ".".repeat(frame as usize + 1))
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

    render_header(app, frame, header_area);

    let [sidebar_area, main_area] = Layout::horizontal([
        Constraint::Length(32),
        Constraint::Min(0),
    ])
    .areas(body_area);

    render_sidebar(app, frame, sidebar_area);
    render_main(app, frame, main_area);

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(format!(" {} ", PRODUCT_NAME), Style::default().fg(Color::Cyan).bold()),
        Span::styled("Ask. Reason. Build.", Style::default().fg(Color::White)),
        Span::raw("  "),
        Span::styled(app.base_url.clone(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" MESSAGE ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let hints: Vec<Span> = match app.input_mode {
        InputMode::Editing => [hint("Enter", "send"), hint("Esc", "stop typing")].concat(),
        InputMode::Normal => {
            let mut hints = Vec::new();
            match app.focus {
                FocusPane::Threads => {
                    hints.extend(hint("j/k", "nav"));
                    hints.extend(hint("Enter", "open"));
                }
                FocusPane::Transcript => {
                    hints.extend(hint("j/k", "scroll"));
                    hints.extend(hint("G", "latest"));
                }
                FocusPane::Input => {}
            }
            if app.state().current_thread().is_some() {
                hints.extend(hint("i", "type"));
            }
            hints.extend(hint("n", "new"));
            hints.extend(hint("r", "refresh"));
            hints.extend(hint("Tab", "focus"));
            hints.extend(hint("q", "quit"));
            hints
        }
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    app.threads_area = Some(area);

    let focused = app.focus == FocusPane::Threads;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Conversations ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [status_area, list_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
    ])
    .areas(inner);

    let status = if app.threads.is_empty() {
        "No conversations yet"
    } else {
        "Clean • Intelligent • Secure"
    };
    frame.render_widget(
        Paragraph::new(Span::styled(status, Style::default().fg(Color::DarkGray).italic())),
        status_area,
    );

    let mut items: Vec<ListItem> = app
        .threads
        .iter()
        .map(|thread| {
            if app.is_active(thread) {
                ListItem::new(format!("▶ {}", thread)).style(Style::default().fg(Color::Cyan).bold())
            } else {
                ListItem::new(format!("  {}", thread))
            }
        })
        .collect();
    items.push(ListItem::new("+ New Conversation").style(Style::default().fg(Color::Green)));

    let highlight = if focused {
        Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    };

    let list = List::new(items).highlight_style(highlight);
    frame.render_stateful_widget(list, list_area, &mut app.thread_state);
}

fn render_main(app: &mut App, frame: &mut Frame, area: Rect) {
    let Some(thread) = app.state().current_thread().cloned() else {
        app.transcript_area = None;
        let hint = Paragraph::new(Text::from(vec![
            Line::default(),
            Line::from(Span::styled(PRODUCT_NAME, Style::default().fg(Color::Cyan).bold())),
            Line::from(Span::styled("Ask. Reason. Build.", Style::default().fg(Color::DarkGray))),
            Line::default(),
            Line::from("Select or create a conversation to begin."),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
        frame.render_widget(hint, area);
        return;
    };

    let notice_height = if app.state().notice().is_some() { 1 } else { 0 };
    let [title_area, transcript_area, notice_area, input_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(notice_height),
        Constraint::Length(3),
    ])
    .areas(area);

    let title = Line::from(vec![
        Span::styled(" Thread ID: ", Style::default().fg(Color::DarkGray)),
        Span::styled(thread.to_string(), Style::default().bold()),
    ]);
    frame.render_widget(Paragraph::new(title), title_area);

    render_transcript(app, frame, transcript_area);

    if let Some(notice) = app.state().notice() {
        let line = Line::from(Span::styled(
            format!(" ✖ {}", notice.text()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line), notice_area);
    }

    render_input(app, frame, input_area);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store area for mouse hit-testing and dimensions for scroll calculations
    app.transcript_area = Some(area);
    app.transcript_height = area.height.saturating_sub(2);
    app.transcript_width = area.width.saturating_sub(2);

    let focused = app.focus == FocusPane::Transcript;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let thinking = app.is_thinking();
    let text = if app.visible_messages().next().is_none() && !thinking {
        Text::from(Span::styled(
            "Start typing to begin a meaningful conversation.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in app.visible_messages() {
            match msg.role {
                Role::Human => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    for line in msg.content.lines() {
                        lines.push(Line::from(line.to_string()));
                    }
                }
                Role::Ai => {
                    lines.push(Line::from(Span::styled(
                        format!("{}:", PRODUCT_NAME),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    for line in msg.content.lines() {
                        lines.push(parse_markdown_line(line));
                    }
                }
                Role::Other => continue,
            }
            lines.push(Line::default());
        }

        if thinking {
            lines.push(Line::from(Span::styled(
                format!("{}:", PRODUCT_NAME),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                thinking_text(app.animation_frame),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let transcript = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.transcript_scroll, 0));

    frame.render_widget(transcript, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing || app.focus == FocusPane::Input {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Message {}... ", PRODUCT_NAME));

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    // Show cursor when editing
    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}
