pub mod dialogs;
pub mod layout;
pub mod menu;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::{
    app::{App, Screen},
    session::{CharState, Session},
    util::{format_hms, format_percentage},
};

const HORIZONTAL_MARGIN: u16 = 1;
const MIN_WIDTH: u16 = 12;
const MIN_HEIGHT: u16 = 5;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            Paragraph::new("terminal too small")
                .alignment(Alignment::Center)
                .render(area, buf);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Min(3),    // text
                Constraint::Length(1), // status bar
                Constraint::Length(1), // notice / hints
            ])
            .split(area);

        render_text(&self.session, chunks[0], buf);
        status_line(self).render(chunks[1], buf);
        footer_line(self).render(chunks[2], buf);

        match self.screen {
            Screen::Typing => {}
            Screen::Stats => dialogs::render_stats(self, area, buf),
            Screen::Help => dialogs::render_help(area, buf),
            Screen::About => dialogs::render_about(area, buf),
            Screen::NameEntry => dialogs::render_name_entry(self, area, buf),
            Screen::TimerEntry => dialogs::render_timer_entry(self, area, buf),
            Screen::ArticleMenu => menu::render_menu(self, area, buf),
        }
    }
}

fn char_style(state: CharState, blank: bool, is_cursor: bool) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let style = match state {
        CharState::Correct => bold.fg(Color::Green),
        CharState::Incorrect if blank => bold.bg(Color::Red),
        CharState::Incorrect => bold.fg(Color::Red),
        CharState::NotTyped => Style::default().add_modifier(Modifier::DIM),
    };
    if is_cursor {
        style.add_modifier(Modifier::UNDERLINED)
    } else {
        style
    }
}

/// The practice text, wrapped and scrolled to the cursor. Runs of equally
/// styled characters share one span.
fn render_text(session: &Session, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", session.article()));
    let inner = block.inner(area);
    block.render(area, buf);

    let chars = session.chars();
    let states = session.states();
    let lines = layout::wrap_lines(chars, inner.width);
    let top = layout::scroll_offset(
        layout::cursor_line(&lines, session.cursor()),
        usize::from(inner.height),
    );

    let visible = lines
        .iter()
        .skip(top)
        .take(usize::from(inner.height))
        .map(|range| {
            let styled = range.clone().map(|i| {
                let style = char_style(
                    states[i],
                    chars[i].is_whitespace(),
                    i == session.cursor() && !session.is_ended(),
                );
                (style, chars[i])
            });
            let chunks = styled.chunk_by(|(style, _)| *style);
            let spans = chunks
                .into_iter()
                .map(|(style, group)| {
                    Span::styled(group.map(|(_, c)| c).collect::<String>(), style)
                })
                .collect::<Vec<_>>();
            Line::from(spans)
        })
        .collect::<Vec<_>>();

    Paragraph::new(visible).render(inner, buf);
}

fn status_line(app: &App) -> Line<'static> {
    let stats = app.session.stats();
    let name = if app.prefs.name.is_empty() {
        "-"
    } else {
        app.prefs.name.as_str()
    };
    let clock = if stats.is_countdown() {
        "Countdown"
    } else {
        "Elapsed"
    };
    let dim = Style::default().add_modifier(Modifier::DIM);
    let sep = || Span::styled(" | ", dim);

    Line::from(vec![
        Span::styled(
            name.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        sep(),
        Span::raw(format!("{}/{}", stats.typed, stats.total)),
        sep(),
        Span::raw(format!("{}%", format_percentage(stats.completion_rate))),
        sep(),
        Span::raw(format!("acc {}%", format_percentage(stats.accuracy_rate))),
        sep(),
        Span::raw(format!("{} cpm", stats.speed)),
        sep(),
        Span::raw(format!("bs {}", stats.backspaces)),
        sep(),
        Span::styled(
            format!("{clock} {}", format_hms(stats.displayed_time())),
            Style::default().fg(Color::Magenta),
        ),
    ])
}

fn footer_line(app: &App) -> Line<'static> {
    match &app.notice {
        Some(notice) => Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(Span::styled(
            "f1 help  ctrl+o articles  ctrl+t timer  esc quit",
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        )),
    }
}
