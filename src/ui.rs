use ratatui::{layout::Flex, prelude::*, widgets::*};

use crate::app::{AppState, PopupKind, SettingsField, View};
use crate::timer::Mode;

const WORK_COLOR: Color = Color::Rgb(255, 107, 107);
const BREAK_COLOR: Color = Color::Rgb(78, 205, 196);
const BORDER_COLOR: Color = Color::Rgb(136, 136, 136);

fn mode_color(mode: Mode) -> Color {
    match mode {
        Mode::Work => WORK_COLOR,
        Mode::Break => BREAK_COLOR,
    }
}

pub fn render_ui(f: &mut Frame, app: &AppState) {
    match app.current_view {
        View::Timer => render_timer(f, app),
        View::Settings => render_settings(f, app),
        View::Help => render_help(f),
    }

    if let Some(popup) = &app.popup {
        render_popup(f, popup.kind, popup.title, &popup.body);
    }
}

fn render_timer(f: &mut Frame, app: &AppState) {
    let timer = &app.timer;
    let color = mode_color(timer.mode());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(4)])
        .split(f.size());

    f.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER_COLOR))
            .title(Span::styled(" 🍅 POMODORO ", Style::default()
                .fg(WORK_COLOR).add_modifier(Modifier::BOLD))),
        chunks[0]
    );

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Percentage(10),
        ])
        .split(chunks[1]);

    f.render_widget(
        Paragraph::new(timer.format_remaining())
            .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color))),
        sections[1]
    );

    f.render_widget(
        Paragraph::new(timer.mode().label())
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[3]
    );

    f.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
            .gauge_style(Style::default().fg(color).bg(Color::Black))
            .ratio(timer.progress()),
        sections[5]
    );

    let (status, status_color) = if timer.is_running() {
        ("▶ RUNNING", Color::Green)
    } else {
        ("⏸ PAUSED", Color::Yellow)
    };
    f.render_widget(
        Paragraph::new(status)
            .style(Style::default().fg(status_color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[7]
    );

    let next_break = match (timer.mode(), timer.next_break_is_long()) {
        (Mode::Break, _) => "",
        (Mode::Work, true) => "  •  long break next",
        (Mode::Work, false) => "  •  short break next",
    };
    let now = chrono::Local::now();
    let info = vec![
        Line::from(Span::styled(
            format!("Sessions: {}{}", timer.completed_sessions(), next_break),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(now.format("%I:%M %p").to_string(), Style::default().fg(Color::DarkGray))),
    ];
    f.render_widget(Paragraph::new(info).alignment(Alignment::Center), sections[9]);

    let controls = vec![
        Line::from(vec![
            span_key("Space"), Span::raw(" Start/Pause  •  "),
            span_key("R"), Span::raw(" Reset  •  "),
            span_key("-/+"), Span::raw(" 1 min  •  "),
            span_key("[/]"), Span::raw(" 5 min"),
        ]),
        Line::from(vec![
            span_key("C"), Span::raw(" Configure  •  "),
            span_key("H"), Span::raw(" Help  •  "),
            span_key("Q"), Span::raw(" Quit"),
        ]),
    ];
    f.render_widget(
        Paragraph::new(controls).alignment(Alignment::Center).style(Style::default().fg(Color::DarkGray)),
        chunks[2]
    );
}

fn span_key(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().fg(BREAK_COLOR).add_modifier(Modifier::BOLD))
}

fn render_help(f: &mut Frame) {
    let area = centered_rect(70, 85, f.size());

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("⌨️  KEYBOARD SHORTCUTS", Style::default().fg(WORK_COLOR).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("  Timer:"),
        help_line("Enter / S", "Start"),
        help_line("P", "Pause"),
        help_line("Space", "Toggle start/pause"),
        help_line("R", "Reset to the first work session"),
        help_line("- / +", "Remove / add one minute (paused only)"),
        help_line("[ / ]", "Remove / add five minutes (paused only)"),
        Line::from(""),
        Line::from("  Configuration:"),
        help_line("C", "Open configuration"),
        help_line("↑↓ / JK", "Select field"),
        help_line("Enter", "Edit / confirm field"),
        help_line("W / Ctrl+S", "Save and reset the timer"),
        help_line("Esc", "Cancel"),
        Line::from(""),
        Line::from("  General:"),
        help_line("Q / Esc", "Quit / Go back"),
        help_line("Ctrl+C", "Force quit"),
        Line::from(""),
        Line::from(Span::styled("  Press any key to close",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
    ];

    f.render_widget(
        Paragraph::new(help_text)
            .block(Block::default()
                .title(" Help ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR))),
        area
    );
}

fn help_line(key: &str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("    {key:<12}"), Style::default().fg(BREAK_COLOR).add_modifier(Modifier::BOLD)),
        Span::raw(action),
    ])
}

fn render_settings(f: &mut Frame, app: &AppState) {
    let area = centered_rect(70, 85, f.size());

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("⚙️  CONFIGURATION", Style::default().fg(WORK_COLOR).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("  ↑↓/jk: Select  •  Enter: Edit  •  W/Ctrl+S: Save  •  Esc: Back",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
        Line::from(""),
    ];

    for (field, draft) in SettingsField::ALL.iter().zip(&app.settings_drafts) {
        let selected = app.settings_field == *field;
        let editing = selected && app.settings_editing;

        lines.push(Line::from(""));

        if editing {
            lines.push(Line::from(vec![
                Span::styled("  > ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Span::styled(field.label(), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            ]));
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(&app.settings_input, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::styled("█", Style::default().fg(Color::Green)),
            ]));
        } else {
            let (prefix, label_style, value_style) = if selected {
                ("  > ", Style::default().fg(BREAK_COLOR).add_modifier(Modifier::BOLD),
                 Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
            } else {
                ("    ", Style::default().fg(Color::Gray), Style::default().fg(Color::DarkGray))
            };

            lines.push(Line::from(vec![Span::styled(prefix, label_style), Span::styled(field.label(), label_style)]));
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(format!("{} {}", draft, field.unit()), value_style),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  Saving resets the timer",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))));

    f.render_widget(
        Paragraph::new(lines)
            .block(Block::default()
                .title(" Configuration ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR))),
        area
    );
}

fn render_popup(f: &mut Frame, kind: PopupKind, title: &str, body: &str) {
    let area = centered_rect(50, 25, f.size());
    let color = match kind {
        PopupKind::Info => BREAK_COLOR,
        PopupKind::Error => Color::Red,
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(body, Style::default().fg(Color::White).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("Press any key", Style::default()
            .fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
    ];

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default()
                .title(format!(" {} ", title))
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color))),
        area
    );
}

/// Percentage-sized box in the middle of `area`.
fn centered_rect(width_pct: u16, height_pct: u16, area: Rect) -> Rect {
    let row = Layout::vertical([Constraint::Percentage(height_pct)])
        .flex(Flex::Center)
        .split(area)[0];
    Layout::horizontal([Constraint::Percentage(width_pct)])
        .flex(Flex::Center)
        .split(row)[0]
}
