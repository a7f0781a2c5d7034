use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use routerchat_core::{Model, Role};
use std::path::Path;

use crate::app::{App, InputMode, NoticeKind};

/// Split a line on `**` markers, rendering the enclosed runs bold.
///
/// An unmatched `**` is kept literally.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let parts: Vec<&str> = text.split("**").collect();
    // An even part count means the last `**` has no partner
    let closed = parts.len() % 2 == 1;

    let mut spans: Vec<Span<'static>> = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        let is_last = i == parts.len() - 1;
        if i % 2 == 1 && (closed || !is_last) {
            if !part.is_empty() {
                spans.push(Span::styled(
                    part.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            }
        } else if i % 2 == 1 {
            spans.push(Span::raw(format!("**{part}")));
        } else if !part.is_empty() {
            spans.push(Span::raw(part.to_string()));
        }
    }

    Line::from(spans)
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
    render_chat_screen(app, frame, body_area);
    render_footer(app, frame, footer_area);

    if app.show_reset_confirm {
        render_reset_confirm(frame, area);
    } else if app.show_model_picker {
        render_model_picker(app, frame, area);
    }
}

fn header_line(model: Model, history: &Path) -> Line<'static> {
    Line::from(vec![
        Span::styled(" routerchat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!(" {} ", model.display_name()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!(" {} ", history.display()),
            Style::default().fg(Color::Gray),
        ),
    ])
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = header_line(app.session.model(), app.session.store().path());
    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" CHAT ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" INSERT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let pairs: &[(&str, &str)] = if app.show_reset_confirm {
        &[(" y ", " clear "), (" n ", " keep ")]
    } else if app.show_model_picker {
        &[(" j/k ", " nav "), (" Enter ", " select "), (" Esc ", " cancel ")]
    } else {
        match app.input_mode {
            InputMode::Editing => &[(" Enter ", " send "), (" Esc ", " stop typing ")],
            InputMode::Normal => &[
                (" i ", " type "),
                (" j/k ", " scroll "),
                (" M ", " model "),
                (" R ", " clear history "),
                (" q ", " quit "),
            ],
        }
    };

    let hints = pairs.iter().flat_map(|(key, label)| {
        [
            Span::styled(*key, key_style),
            Span::styled(*label, label_style),
        ]
    });

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

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    // Store dimensions for scroll calculations (inner size minus borders)
    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    render_history(app, frame, chat_area);
    render_input(app, frame, input_area);
}

fn render_history(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.input_mode == InputMode::Normal {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Chat: {} ", app.session.model().provider_id()));

    let messages = app.session.visible_messages();
    let mut lines: Vec<Line> = Vec::new();

    if messages.is_empty() && !app.is_loading() && app.notice.is_none() {
        lines.push(Line::from(Span::styled(
            "Type a message to start chatting...",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for msg in messages {
        match msg.role {
            Role::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                lines.extend(msg.content.lines().map(|l| Line::from(l.to_string())));
            }
            Role::Assistant | Role::System => {
                lines.push(Line::from(Span::styled(
                    "Bot:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                lines.extend(msg.content.lines().map(parse_markdown_line));
            }
        }
        lines.push(Line::default());
    }

    if app.is_loading() {
        lines.push(Line::from(Span::styled(
            "Bot:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{dots}"),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    if let Some(notice) = &app.notice {
        let style = match notice.kind {
            NoticeKind::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            NoticeKind::Info => Style::default().fg(Color::Green),
        };
        lines.push(Line::from(Span::styled(notice.text.clone(), style)));
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let title = if app.is_loading() {
        " Waiting for reply... "
    } else {
        " Type your message... "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width == 0 || cursor_pos < inner_width {
        0
    } else {
        cursor_pos - inner_width + 1
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

    if editing && !app.show_model_picker && !app.show_reset_confirm {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_model_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let models = Model::all();
    let popup_area = centered(area, 44, models.len() as u16 + 2);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Choose a Model ");

    let current = app.session.model();
    let items: Vec<ListItem> = models
        .iter()
        .map(|model| {
            let (prefix, style) = if *model == current {
                ("* ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            } else {
                ("  ", Style::default())
            };
            ListItem::new(format!("{}{}", prefix, model.display_name())).style(style)
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

    frame.render_stateful_widget(list, popup_area, &mut app.model_picker_state);
}

fn render_reset_confirm(frame: &mut Frame, area: Rect) {
    let popup_area = centered(area, 48, 5);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Clear Chat History ");

    let text = Text::from(vec![
        Line::from("Delete every message and start over?"),
        Line::from(Span::styled(
            "y to clear, n or Esc to keep",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    frame.render_widget(Paragraph::new(text).block(block), popup_area);
}
