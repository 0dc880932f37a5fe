//! TUI Rendering
//!
//! One render function per screen, plus the alert overlay.

use super::app::{Alert, App, ProgressState};
use super::events::Screen;
use super::form::{FieldId, field_text};
use crate::api::{TodoLists, WeekProgress};
use crate::auth::AuthState;
use crate::goals::{GoalEditor, WEEKS};
use crate::utils::fit_width;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
};

const BRAND_BLUE: Color = Color::Rgb(70, 130, 180);
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Render the entire UI
pub fn render(f: &mut Frame, app: &App) {
    if app.screen == Screen::Splash {
        render_splash(f, f.area());
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(6),    // Screen body
            Constraint::Length(3), // Key hints / status
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);

    match app.screen {
        Screen::Splash => {}
        Screen::Main => render_main(f, app, chunks[1]),
        Screen::Create => render_create(f, app, chunks[1]),
        Screen::Success => render_success(f, app, chunks[1]),
        Screen::Lists => render_lists(f, app, chunks[1]),
    }

    render_footer(f, app, chunks[2]);

    if let Some(alert) = &app.alert {
        render_alert(f, alert, f.area());
    }
}

fn spinner(app: &App) -> &'static str {
    SPINNER[(app.animation_frame / 2) % SPINNER.len()]
}

fn brand_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BRAND_BLUE))
        .title(Span::styled(
            title,
            Style::default().fg(BRAND_BLUE).add_modifier(Modifier::BOLD),
        ))
}

fn render_splash(f: &mut Frame, area: Rect) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(5),
            Constraint::Min(0),
        ])
        .split(area);

    let lines = vec![
        Line::from(Span::styled(
            "12 Week Goals",
            Style::default().fg(BRAND_BLUE).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("v{}", crate::VERSION),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        vertical[1],
    );
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(
            app.screen.title(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(brand_block(" 12 Week Goals "));
    f.render_widget(header, area);
}

fn key_hints(app: &App) -> Vec<(&'static str, &'static str)> {
    match app.screen {
        Screen::Splash => vec![],
        Screen::Main => vec![
            ("n", "New goal group"),
            ("l", "My lists"),
            ("r", "Reload progress"),
            ("q", "Quit"),
        ],
        Screen::Create => vec![
            ("Tab/Shift+Tab", "Move"),
            ("Ctrl+A", "Add goal"),
            ("Ctrl+D", "Remove goal"),
            ("Ctrl+S", "Send"),
            ("Esc", "Back"),
        ],
        Screen::Success => match app.success.as_ref() {
            Some(view) if view.code_input.is_some() => {
                vec![("Enter", "Send code"), ("Ctrl+O", "Open URL"), ("Esc", "Cancel")]
            }
            Some(view) if view.auth_url.is_some() => {
                vec![("o", "Open URL"), ("c", "Enter code"), ("Enter", "Done")]
            }
            _ => vec![("Enter", "Done")],
        },
        Screen::Lists => match app.relay.state() {
            AuthState::AwaitingPastedCode { .. } => {
                vec![("Ctrl+O", "Open URL"), ("Enter", "Send code"), ("Esc", "Back")]
            }
            AuthState::Error { .. } => vec![("r", "Retry"), ("Esc", "Back")],
            _ => vec![("Esc", "Back")],
        },
    }
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(status) = &app.status_message {
        Line::from(Span::styled(
            format!(" {status}"),
            Style::default().fg(Color::Yellow),
        ))
    } else if app.is_submitting {
        Line::from(Span::styled(
            format!(" {} Sending...", spinner(app)),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        let mut spans = Vec::new();
        for (key, label) in key_hints(app) {
            spans.push(Span::styled(
                format!(" [{key}] "),
                Style::default().fg(BRAND_BLUE).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(label, Style::default().fg(Color::DarkGray)));
        }
        Line::from(spans)
    };

    let footer = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(footer, area);
}

// --- Main -----------------------------------------------------------------

fn render_main(f: &mut Frame, app: &App, area: Rect) {
    let block = brand_block(" Week Progress ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    match &app.progress {
        ProgressState::Idle => {}
        ProgressState::Loading => {
            f.render_widget(
                Paragraph::new(format!(" {} Loading progress...", spinner(app))),
                inner,
            );
        }
        ProgressState::Failed(message) => {
            let lines = vec![
                Line::from(Span::styled(
                    " Could not load progress",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(format!(" {message}")),
                Line::from(""),
                Line::from(Span::styled(
                    " Press [r] to retry",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
        }
        ProgressState::Loaded(progress) => render_progress(f, progress, inner),
    }
}

/// Detail lines of the progress panel
pub fn progress_lines(progress: &WeekProgress) -> Vec<String> {
    let mut lines = vec![
        progress.message.clone(),
        String::new(),
        format!("Start date:      {}", progress.start_date),
        format!("Current date:    {}", progress.current_date),
        format!("Weeks completed: {}", progress.weeks_completed),
        format!("Weeks remaining: {}", progress.weeks_remaining),
        format!("Days since start: {}", progress.days_since_start),
    ];
    if let (Some(week), Some(total)) = (progress.current_week, progress.total_weeks) {
        lines.push(format!("Current week:    {week} of {total}"));
    }
    if let Some(next) = &progress.next_week_starts_on {
        lines.push(format!("Next week starts: {next}"));
    }
    lines.push(if progress.is_completed {
        "Status:          completed".to_string()
    } else {
        "Status:          in progress".to_string()
    });
    lines
}

fn render_progress(f: &mut Frame, progress: &WeekProgress, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let ratio = if progress.progress_percentage.is_finite() {
        (progress.progress_percentage / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(BRAND_BLUE))
        .ratio(ratio)
        .label(format!("{:.1}%", progress.progress_percentage));
    f.render_widget(gauge, chunks[0]);

    let lines: Vec<Line> = progress_lines(progress)
        .into_iter()
        .map(|l| Line::from(format!(" {l}")))
        .collect();
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[1]);
}

// --- Create ---------------------------------------------------------------

/// Form lines and the index of the focused line.
fn form_lines<'a>(editor: &'a GoalEditor, focus: FieldId, width: usize) -> (Vec<Line<'a>>, usize) {
    let label_style = Style::default().fg(Color::DarkGray);
    let mut lines = Vec::new();
    let mut focused_line = 0;

    let mut field = |lines: &mut Vec<Line<'a>>, label: String, id: FieldId| {
        let focused = id == focus;
        if focused {
            focused_line = lines.len();
        }
        let value = fit_width(field_text(editor, id), width.saturating_sub(label.len() + 4));
        let value_style = if focused {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if focused { "> " } else { "  " };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(BRAND_BLUE)),
            Span::styled(label, label_style),
            Span::styled(value, value_style),
            Span::styled(if focused { "_" } else { "" }, Style::default().fg(BRAND_BLUE)),
        ]));
    };

    field(&mut lines, "Group name: ".to_string(), FieldId::GroupName);
    field(&mut lines, "Start date: ".to_string(), FieldId::StartDate);

    for (i, goal) in editor.goals().iter().enumerate() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  Goal {}", i + 1),
            Style::default().fg(BRAND_BLUE).add_modifier(Modifier::BOLD),
        )));
        field(&mut lines, "Name:    ".to_string(), FieldId::GoalName(goal.id));
        for week in 0..WEEKS {
            field(
                &mut lines,
                format!("Week {:>2}: ", week + 1),
                FieldId::Task(goal.id, week),
            );
        }
    }
    (lines, focused_line)
}

fn render_create(f: &mut Frame, app: &App, area: Rect) {
    let Some(editor) = app.editor.as_ref() else {
        return;
    };
    let title = format!(" Goals ({}) ", editor.goal_count());
    let block = brand_block(&title);
    let inner = block.inner(area);

    let (lines, focused_line) = form_lines(editor, app.form.focus(), inner.width as usize);
    let height = inner.height as usize;
    // Keep the focused field roughly centred once the form overflows
    let scroll = focused_line.saturating_sub(height / 2);

    let form = Paragraph::new(lines)
        .block(block)
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(form, area);
}

// --- Success --------------------------------------------------------------

fn render_success(f: &mut Frame, app: &App, area: Rect) {
    let block = brand_block(" Sent ");
    let Some(view) = app.success.as_ref() else {
        f.render_widget(block, area);
        return;
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {}", view.message),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if let Some(url) = &view.auth_url {
        lines.push(Line::from(" Authorize access to your task lists:"));
        lines.push(Line::from(Span::styled(
            format!(" {url}"),
            Style::default().fg(BRAND_BLUE),
        )));
        lines.push(Line::from(""));
        if view.authorizing {
            lines.push(Line::from(format!(" {} Sending code...", spinner(app))));
        } else if let Some(code) = &view.code_input {
            lines.push(Line::from(vec![
                Span::styled(" Code: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{code}_"),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
        }
    }

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

// --- Lists ----------------------------------------------------------------

/// Body lines for a lists payload
pub fn list_lines(lists: &TodoLists) -> Vec<String> {
    let source = if lists.from_cache() {
        "from cache"
    } else {
        "freshly authorized"
    };
    let mut lines = vec![format!("{} list(s), {source}", lists.total_lists)];
    if let Some(message) = &lists.message {
        lines.push(message.clone());
    }
    lines.push(String::new());
    lines.extend(lists.list_names.iter().map(|name| format!("  - {name}")));
    lines
}

fn render_lists(f: &mut Frame, app: &App, area: Rect) {
    let block = brand_block(" Task Lists ");
    let width = block.inner(area).width as usize;

    let lines: Vec<Line> = match app.relay.state() {
        AuthState::NoCache => vec![Line::from(format!(
            " {} Checking for a cached token...",
            spinner(app)
        ))],
        AuthState::AuthUrlRequested => vec![Line::from(format!(
            " {} Requesting an authorization URL...",
            spinner(app)
        ))],
        AuthState::AwaitingPastedCode { auth_url } => vec![
            Line::from(" Open this URL, sign in, and paste the code you receive:"),
            Line::from(Span::styled(
                format!(" {auth_url}"),
                Style::default().fg(BRAND_BLUE),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled(" Code: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{}_", fit_width(&app.code_input, width.saturating_sub(9))),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ],
        AuthState::CodeSubmitted { .. } => vec![Line::from(format!(
            " {} Exchanging code...",
            spinner(app)
        ))],
        AuthState::ListsDisplayed(lists) => list_lines(lists)
            .into_iter()
            .map(|l| Line::from(format!(" {}", fit_width(&l, width.saturating_sub(1)))))
            .collect(),
        AuthState::Error { message } => vec![
            Line::from(Span::styled(
                " Could not load your lists",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(" {message}")),
            Line::from(""),
            Line::from(Span::styled(
                " Press [r] to retry",
                Style::default().fg(Color::DarkGray),
            )),
        ],
    };

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

// --- Alert ----------------------------------------------------------------

fn render_alert(f: &mut Frame, alert: &Alert, area: Rect) {
    let dialog_width = 64u16.min(area.width.saturating_sub(4));
    let dialog_height = (alert.lines.len() as u16 + 5).min(area.height.saturating_sub(2));

    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(dialog_height),
            Constraint::Min(0),
        ])
        .split(area);
    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(dialog_width),
            Constraint::Min(0),
        ])
        .split(v_chunks[1]);
    let dialog_area = h_chunks[1];

    let mut lines = vec![Line::from("")];
    lines.extend(alert.lines.iter().map(|l| Line::from(format!(" {l}"))));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " [Enter] OK",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Clear, dialog_area);
    let dialog = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(Span::styled(
                    format!(" {} ", alert.title),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
        );
    f.render_widget(dialog, dialog_area);
}
