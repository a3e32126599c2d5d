use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use crate::app::{App, InputMode, Screen};
use crate::models::{DiagnosisResult, Phase, Sender};

/// Split on `**` markers, rendering every odd segment bold
fn styled_line(text: &str) -> Line<'static> {
    if !text.contains("**") {
        return Line::from(text.to_string());
    }
    let spans: Vec<Span<'static>> = text
        .split("**")
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| {
            if i % 2 == 1 {
                Span::styled(part.to_string(), Style::default().add_modifier(Modifier::BOLD))
            } else {
                Span::raw(part.to_string())
            }
        })
        .collect();
    Line::from(spans)
}

fn section_title(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
    ))
}

fn push_section(lines: &mut Vec<Line<'static>>, title: &str, body: Option<&str>) {
    let Some(body) = body.filter(|b| !b.trim().is_empty()) else {
        return;
    };
    lines.push(section_title(title));
    for line in body.lines() {
        lines.push(styled_line(line));
    }
}

fn push_bullets(lines: &mut Vec<Line<'static>>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    lines.push(Line::from(Span::styled(
        format!("  {}", title),
        Style::default().fg(Color::Magenta),
    )));
    for item in items {
        lines.push(Line::from(format!("    • {}", item)));
    }
}

/// Render a diagnosis as card lines. Absent sections are left out.
pub fn diagnosis_lines(diagnosis: &DiagnosisResult) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if !diagnosis.symptoms.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Symptoms: ", Style::default().fg(Color::DarkGray)),
            Span::styled(diagnosis.symptoms.join(", "), Style::default().fg(Color::Cyan)),
        ]));
    }

    if diagnosis.has_match() {
        lines.push(Line::from(Span::styled(
            diagnosis.disease_info.disease.clone(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "No matching diseases",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    if diagnosis.top_diseases.is_empty() {
        let info = &diagnosis.disease_info;
        push_section(&mut lines, "Description", info.description.as_deref());
        push_section(&mut lines, "Recommended Workout", info.workout.as_deref());
        push_section(&mut lines, "Precautions", info.precautions.as_deref());
        push_section(&mut lines, "Diet", info.diet.as_deref());
    } else {
        lines.push(section_title("Top Matching Diseases"));
        for (i, m) in diagnosis.top_diseases.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("{}. {}", i + 1, m.disease), Style::default().bold()),
                Span::raw("  "),
                Span::styled(m.match_label(), Style::default().fg(Color::Green)),
            ]));
            push_bullets(&mut lines, "Recommended Workouts", &m.workouts);
            push_bullets(&mut lines, "Precautions", &m.precautions);
        }
    }

    push_section(&mut lines, "Additional Information", Some(&diagnosis.additional_info));

    if let Some(url) = &diagnosis.wikipedia_image {
        lines.push(Line::from(vec![
            Span::styled("Image: ", Style::default().fg(Color::DarkGray)),
            Span::styled(url.clone(), Style::default().fg(Color::Blue).underlined()),
        ]));
    }

    lines
}

/// Wrap the lines and measure how many rows they take at `width`,
/// using the same word wrapping the paragraph renders with
fn wrapped(lines: Vec<Line<'static>>, width: u16) -> (Paragraph<'static>, u16) {
    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    let rows = u16::try_from(paragraph.line_count(width)).unwrap_or(u16::MAX);
    (paragraph, rows)
}

fn thinking_line(app: &App, label: &str) -> Line<'static> {
    // Animated ellipsis: cycles through ".", "..", "..."
    let dots = ".".repeat((app.animation_frame as usize) + 1);
    Line::from(Span::styled(
        format!("{}{}", label, dots),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    ))
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, input, footer
    let [header_area, body_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Chat => render_chat(app, frame, body_area),
        Screen::Analyze => render_analyze(app, frame, body_area),
    }

    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let tab = |label: &'static str, active: bool| {
        if active {
            Span::styled(format!(" {} ", label), Style::default().fg(Color::Black).bg(Color::Cyan).bold())
        } else {
            Span::styled(format!(" {} ", label), Style::default().fg(Color::DarkGray))
        }
    };

    let title = Line::from(vec![
        Span::styled(" Symptom Checker ", Style::default().fg(Color::Cyan).bold()),
        tab("Chat", app.screen == Screen::Chat),
        tab("Analyze", app.screen == Screen::Analyze),
        Span::raw(" "),
        Span::styled(app.service_url.clone(), Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Conversation ");

    let mut lines: Vec<Line<'static>> = Vec::new();
    let messages = app.chat.conversation().all();

    if messages.is_empty() && !app.chat.is_loading() {
        lines.push(Line::from(Span::styled(
            "Describe your symptoms and press Enter...",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for msg in messages {
        let time = msg.timestamp.format("%H:%M").to_string();
        let (who, color) = match msg.sender {
            Sender::User => ("You", Color::Cyan),
            Sender::Bot => ("MD", Color::Yellow),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{}:", who), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(format!(" {}", time), Style::default().fg(Color::DarkGray)),
        ]));
        for line in msg.text.lines() {
            lines.push(styled_line(line));
        }
        if let Some(diagnosis) = &msg.diagnosis {
            for line in diagnosis_lines(diagnosis) {
                let mut spans = vec![Span::styled("│ ", Style::default().fg(Color::DarkGray))];
                spans.extend(line.spans);
                lines.push(Line::from(spans));
            }
        }
        lines.push(Line::default());
    }

    if app.chat.is_loading() {
        lines.push(Line::from(Span::styled(
            "MD:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(thinking_line(app, "Analyzing"));
    }

    let inner_height = area.height.saturating_sub(2);
    let inner_width = area.width.saturating_sub(2);
    let (chat, rows) = wrapped(lines, inner_width);
    app.chat_scroll.update(inner_height, rows);

    let chat = chat.block(block).scroll((app.chat_scroll.offset, 0));

    frame.render_widget(chat, area);
}

fn render_analyze(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Medical Symptom Analysis ");

    let lines: Vec<Line<'static>> = if app.analyze.is_loading() {
        vec![thinking_line(app, "Analyzing symptoms")]
    } else if let Some(result) = app.analyze.current() {
        diagnosis_lines(result)
    } else {
        vec![Line::from(Span::styled(
            "Describe your symptoms below to see the top matching diseases.",
            Style::default().fg(Color::DarkGray),
        ))]
    };

    let inner_height = area.height.saturating_sub(2);
    let inner_width = area.width.saturating_sub(2);
    let (results, rows) = wrapped(lines, inner_width);
    app.analyze_scroll.follow = false;
    app.analyze_scroll.update(inner_height, rows);

    let results = results.block(block).scroll((app.analyze_scroll.offset, 0));

    frame.render_widget(results, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let loading = app.controller().is_loading();
    let border_color = if loading {
        Color::DarkGray
    } else if app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::Gray
    };
    let title = match app.screen {
        Screen::Chat => " Describe your symptoms ",
        Screen::Analyze => " Analyze symptoms ",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let input = app.input();

    // Horizontal scroll keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width > 0 && input.cursor >= inner_width {
        input.cursor - inner_width + 1
    } else {
        0
    };
    let visible_text: String = input.text.chars().skip(scroll_offset).take(inner_width).collect();

    let paragraph = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(paragraph, area);

    if app.input_mode == InputMode::Editing && !loading {
        let cursor_x = (input.cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let state = app.controller().state();
    let status = match state.phase {
        Phase::Error => Span::styled(
            format!(" {} ", state.error_message.as_deref().unwrap_or("Error")),
            Style::default().fg(Color::White).bg(Color::Red),
        ),
        Phase::Loading => Span::styled(" Waiting for diagnosis service ", Style::default().fg(Color::Yellow)),
        Phase::Success | Phase::Idle => Span::raw(""),
    };

    let hints = match app.input_mode {
        InputMode::Editing => " Enter send  Esc normal  Tab switch  PgUp/PgDn scroll  Ctrl-C quit",
        InputMode::Normal => " i edit  j/k scroll  g/G top/bottom  Tab switch  q quit",
    };

    let footer = Line::from(vec![
        status,
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(footer), area);
}
