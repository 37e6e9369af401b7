use chrono::{DateTime, Local};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::app::{App, TimerField};
use crate::ui::layout::centered_rect;
use crate::util::{format_datetime, format_hms};

const NONE: &str = "none";

fn dialog(title: &str, lines: Vec<Line<'_>>, area: Rect, buf: &mut Buffer) {
    Clear.render(area, buf);
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {title} "))
                .title_alignment(Alignment::Center),
        )
        .wrap(Wrap { trim: false })
        .render(area, buf);
}

fn row<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("{label:<12}"),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(value),
    ])
}

pub fn render_stats(app: &App, area: Rect, buf: &mut Buffer) {
    let name = if app.prefs.name.is_empty() {
        NONE.to_string()
    } else {
        app.prefs.name.clone()
    };

    let mut lines = vec![row("Name", name)];
    match app.final_snapshot() {
        Some(snap) => {
            let at = |t: Option<DateTime<Local>>| {
                t.as_ref().map_or(NONE.to_string(), format_datetime)
            };
            lines.extend([
                row("Article", snap.article.to_string()),
                row("Started", at(snap.started_at)),
                row("Ended", at(snap.ended_at)),
                row("Elapsed", format_hms(snap.elapsed)),
                row("Completion", format!("{:.2}%", snap.completion_rate())),
                row(
                    "Typed",
                    format!("{}/{}", snap.typed_chars, snap.total_chars),
                ),
                row("Accuracy", format!("{:.2}%", snap.accuracy_rate())),
                row("Backspaces", snap.backspace_count.to_string()),
                row("Speed", format!("{} chars/min", snap.speed())),
            ]);
            if let Some(reason) = snap.end_reason {
                lines.push(row("Ended by", reason.to_string()));
            }
        }
        None => {
            for label in [
                "Article",
                "Started",
                "Ended",
                "Elapsed",
                "Completion",
                "Typed",
                "Accuracy",
                "Backspaces",
                "Speed",
            ] {
                lines.push(row(label, NONE.to_string()));
            }
        }
    }
    lines.push(Line::default());
    lines.push(hint("esc close  ctrl+r restart"));

    dialog("Statistics", lines, centered_rect(60, 70, area), buf);
}

fn hint(text: &str) -> Line<'_> {
    Line::from(Span::styled(
        text,
        Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
}

const HELP: &[(&str, &str)] = &[
    ("type", "practice the text"),
    ("backspace", "undo the last character"),
    ("ctrl+o", "choose an article"),
    ("ctrl+n", "set your name"),
    ("ctrl+t", "countdown timer"),
    ("ctrl+s", "statistics"),
    ("ctrl+e", "end the session"),
    ("ctrl+r", "restart the article"),
    ("f1 / f2", "help / about"),
    ("esc", "close dialog or quit"),
];

pub fn render_help(area: Rect, buf: &mut Buffer) {
    let lines = HELP
        .iter()
        .map(|(key, action)| row(key, action.to_string()))
        .collect();
    dialog("Help", lines, centered_rect(60, 60, area), buf);
}

pub fn render_about(area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(Span::styled(
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::from(env!("CARGO_PKG_DESCRIPTION")).alignment(Alignment::Center),
        Line::default(),
        hint("esc close"),
    ];
    dialog("About", lines, centered_rect(50, 40, area), buf);
}

pub fn render_name_entry(app: &App, area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(vec![
            Span::raw("Name: "),
            Span::styled(
                app.name_input.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ", Style::default().add_modifier(Modifier::UNDERLINED)),
        ]),
        Line::default(),
        hint("enter save  esc cancel"),
    ];
    dialog("Name", lines, centered_rect(50, 30, area), buf);
}

pub fn render_timer_entry(app: &App, area: Rect, buf: &mut Buffer) {
    let form = &app.timer_form;
    let field = |f: TimerField, label: &'static str| {
        let style = if form.focus == f {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default()
        };
        vec![
            Span::raw(format!("{label} ")),
            Span::styled(format!("{:>3}", form.field(f)), style),
            Span::raw("  "),
        ]
    };

    let mut fields = field(TimerField::Hours, "h");
    fields.extend(field(TimerField::Minutes, "m"));
    fields.extend(field(TimerField::Seconds, "s"));

    let lines = vec![
        Line::from(format!(
            "Countdown: {}",
            if form.enabled { "on" } else { "off" }
        )),
        Line::from(fields),
        Line::default(),
        hint("tab next  space on/off  enter apply  esc cancel"),
    ];
    dialog("Timer", lines, centered_rect(60, 35, area), buf);
}
