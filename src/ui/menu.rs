use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, StatefulWidget, Widget},
};

use crate::app::{App, MenuLevel};
use crate::ui::layout::centered_rect;

/// Two-level picker: folders, then the entries of the selected folder.
pub fn render_menu(app: &App, area: Rect, buf: &mut Buffer) {
    let area = centered_rect(70, 80, area);
    Clear.render(area, buf);

    let remembered = app.remembered();
    let (title, items, selected): (String, Vec<ListItem>, usize) = match app.menu.level {
        MenuLevel::Folders => (
            " Articles ".to_string(),
            app.catalog
                .folders
                .iter()
                .map(|f| ListItem::new(format!("{} ({})", f.name, f.entries.len())))
                .collect(),
            app.menu.folder,
        ),
        MenuLevel::Entries => {
            let folder = app.catalog.folders.get(app.menu.folder);
            let items = folder
                .map(|f| {
                    f.entries
                        .iter()
                        .map(|e| {
                            let item = ListItem::new(format!(
                                "{} {} ({})",
                                e.number, e.title, e.char_count
                            ));
                            if Some(&e.id) == remembered {
                                item.style(Style::default().fg(Color::Cyan))
                            } else {
                                item
                            }
                        })
                        .collect()
                })
                .unwrap_or_default();
            (
                format!(" {} ", folder.map_or("", |f| f.name.as_str())),
                items,
                app.menu.entry,
            )
        }
    };

    let empty = items.is_empty();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_alignment(Alignment::Center)
                .title_bottom(" enter open  r random  esc close "),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected((!empty).then_some(selected));
    StatefulWidget::render(list, area, buf, &mut state);
}
