//! Application state: the running session plus every dialog around it.
//!
//! All input arrives through [`App::handle_key`] and [`App::on_tick`] from a
//! single loop, so nothing here is shared across threads.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{info, warn};

use crate::article::{ArticleId, ArticleSource, Catalog};
use crate::config::{Preferences, PreferencesStore};
use crate::countdown::Countdown;
use crate::history::{HistoryLog, HistoryRecord};
use crate::session::{Session, SessionEvent};
use crate::stats::Snapshot;

/// Longest accepted name, in characters.
pub const MAX_NAME_LEN: usize = 32;
/// Digits accepted per timer field.
pub const MAX_TIMER_DIGITS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Typing,
    Stats,
    Help,
    About,
    NameEntry,
    TimerEntry,
    ArticleMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerField {
    #[default]
    Hours,
    Minutes,
    Seconds,
}

impl TimerField {
    fn next(self) -> Self {
        match self {
            TimerField::Hours => TimerField::Minutes,
            TimerField::Minutes => TimerField::Seconds,
            TimerField::Seconds => TimerField::Hours,
        }
    }

    fn prev(self) -> Self {
        match self {
            TimerField::Hours => TimerField::Seconds,
            TimerField::Minutes => TimerField::Hours,
            TimerField::Seconds => TimerField::Minutes,
        }
    }
}

/// Editable copy of the countdown shown in the timer dialog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimerForm {
    pub enabled: bool,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
    pub focus: TimerField,
}

impl TimerForm {
    pub fn from_countdown(countdown: Countdown) -> Self {
        Self {
            enabled: countdown.enabled,
            hours: countdown.hours.to_string(),
            minutes: countdown.minutes.to_string(),
            seconds: countdown.seconds.to_string(),
            focus: TimerField::Hours,
        }
    }

    pub fn field(&self, field: TimerField) -> &str {
        match field {
            TimerField::Hours => &self.hours,
            TimerField::Minutes => &self.minutes,
            TimerField::Seconds => &self.seconds,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            TimerField::Hours => &mut self.hours,
            TimerField::Minutes => &mut self.minutes,
            TimerField::Seconds => &mut self.seconds,
        }
    }

    pub fn push_digit(&mut self, c: char) -> bool {
        let field = self.focused_mut();
        if !c.is_ascii_digit() || field.len() >= MAX_TIMER_DIGITS {
            return false;
        }
        field.push(c);
        true
    }

    pub fn pop(&mut self) {
        self.focused_mut().pop();
    }

    /// Empty fields count as zero.
    pub fn to_countdown(&self) -> Countdown {
        let parse = |s: &str| s.parse::<u32>().unwrap_or(0);
        Countdown::new(
            self.enabled,
            parse(&self.hours),
            parse(&self.minutes),
            parse(&self.seconds),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuLevel {
    #[default]
    Folders,
    Entries,
}

/// Selection inside the two-level article picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuState {
    pub level: MenuLevel,
    pub folder: usize,
    pub entry: usize,
}

pub struct App {
    pub session: Session,
    pub prefs: Preferences,
    pub catalog: Catalog,
    pub screen: Screen,
    pub menu: MenuState,
    pub name_input: String,
    pub timer_form: TimerForm,
    /// One-line message shown in the status area.
    pub notice: Option<String>,
    remembered: Option<ArticleId>,
    text: String,
    /// A session ended behind an open dialog; its statistics show on close.
    stats_pending: bool,
    should_quit: bool,
    articles: Box<dyn ArticleSource>,
    store: Box<dyn PreferencesStore>,
    history: Option<HistoryLog>,
}

impl App {
    pub fn new(
        articles: Box<dyn ArticleSource>,
        store: Box<dyn PreferencesStore>,
        history: Option<HistoryLog>,
    ) -> Self {
        let prefs = store.load();
        let mut notice = None;
        let catalog = match articles.catalog() {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!(%err, "failed to build article catalog");
                notice = Some(format!("no articles: {err}"));
                Catalog::default()
            }
        };

        Self {
            session: Session::new(prefs.countdown),
            timer_form: TimerForm::from_countdown(prefs.countdown),
            name_input: prefs.name.clone(),
            prefs,
            catalog,
            screen: Screen::Typing,
            menu: MenuState::default(),
            notice,
            remembered: None,
            text: String::new(),
            stats_pending: false,
            should_quit: false,
            articles,
            store,
            history,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn remembered(&self) -> Option<&ArticleId> {
        self.remembered.as_ref()
    }

    /// Loads an article into a fresh session. On failure the current session
    /// is left untouched and a notice is shown.
    pub fn open_article(&mut self, id: &ArticleId) -> bool {
        match self.articles.read(id) {
            Ok(text) => {
                info!(article = %id, "article opened");
                self.session.set_article(id.clone());
                self.start(text);
                self.remembered = Some(id.clone());
                self.notice = None;
                true
            }
            Err(err) => {
                warn!(article = %id, %err, "failed to open article");
                self.notice = Some(err.to_string());
                false
            }
        }
    }

    pub fn load_custom(&mut self, text: &str) {
        self.session.set_article(ArticleId::custom());
        self.start(text.to_string());
        self.notice = None;
    }

    pub fn open_random(&mut self) -> bool {
        let picked = self.catalog.random().map(|e| e.id.clone());
        match picked {
            Some(id) => self.open_article(&id),
            None => {
                self.notice = Some("no articles available".to_string());
                false
            }
        }
    }

    /// Opens the first catalog entry, if any.
    pub fn open_first(&mut self) -> bool {
        let first = self.catalog.entries().next().map(|e| e.id.clone());
        match first {
            Some(id) => self.open_article(&id),
            None => false,
        }
    }

    /// Starts the current text over.
    pub fn restart(&mut self) {
        let text = std::mem::take(&mut self.text);
        self.start(text);
    }

    fn start(&mut self, text: String) {
        self.session.set_countdown(self.prefs.countdown);
        self.session.load(&text);
        self.session.drain_events();
        self.text = text;
        self.stats_pending = false;
        self.screen = Screen::Typing;
    }

    pub fn set_name(&mut self, name: &str) {
        self.prefs.name = name.trim().chars().take(MAX_NAME_LEN).collect();
        self.persist();
    }

    /// Stores the countdown; an idle session starts using it right away.
    pub fn apply_countdown(&mut self, countdown: Countdown) {
        let countdown = countdown.normalized();
        self.prefs.countdown = countdown;
        self.session.set_countdown(countdown);
        self.timer_form = TimerForm::from_countdown(countdown);
        self.persist();
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.prefs) {
            warn!(%err, "failed to save preferences");
            self.notice = Some(format!("preferences not saved: {err}"));
        }
    }

    /// Snapshot of the finished session, if there is one.
    pub fn final_snapshot(&self) -> Option<Snapshot> {
        self.session.is_ended().then(|| self.session.snapshot())
    }

    pub fn on_tick(&mut self) {
        self.on_tick_at(Local::now());
    }

    pub fn on_tick_at(&mut self, now: DateTime<Local>) {
        self.session.tick_at(now);
        self.process_events();
    }

    fn process_events(&mut self) {
        for event in self.session.drain_events() {
            if let SessionEvent::Ended { snapshot, .. } = event {
                self.record_history(&snapshot);
                match self.screen {
                    Screen::Typing | Screen::Stats => self.screen = Screen::Stats,
                    _ => self.stats_pending = true,
                }
            }
        }
    }

    /// Leaves the current dialog, showing statistics that arrived meanwhile.
    fn close_dialog(&mut self) {
        self.screen = if std::mem::take(&mut self.stats_pending) {
            Screen::Stats
        } else {
            Screen::Typing
        };
    }

    fn record_history(&self, snapshot: &Snapshot) {
        let Some(history) = &self.history else {
            return;
        };
        let record = HistoryRecord::from_snapshot(&self.prefs.name, snapshot);
        if let Err(err) = history.append(&record) {
            warn!(path = %history.path().display(), %err, "failed to append history");
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Typing => self.on_typing_key(key),
            Screen::Stats | Screen::Help | Screen::About => self.on_info_key(key),
            Screen::NameEntry => self.on_name_key(key),
            Screen::TimerEntry => self.on_timer_key(key),
            Screen::ArticleMenu => self.on_menu_key(key),
        }
    }

    fn on_typing_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('o') => self.open_menu(),
                KeyCode::Char('n') => {
                    self.name_input = self.prefs.name.clone();
                    self.screen = Screen::NameEntry;
                }
                KeyCode::Char('t') => {
                    self.timer_form = TimerForm::from_countdown(self.prefs.countdown);
                    self.screen = Screen::TimerEntry;
                }
                KeyCode::Char('s') => self.screen = Screen::Stats,
                KeyCode::Char('e') => {
                    self.session.end_manually();
                    self.process_events();
                }
                KeyCode::Char('r') => self.restart(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::F(1) => self.screen = Screen::Help,
            KeyCode::F(2) => self.screen = Screen::About,
            KeyCode::Backspace => {
                self.session.record_backspace();
                self.process_events();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::ALT) => {
                self.session.record_keystroke(c);
                self.process_events();
            }
            _ => {}
        }
    }

    fn on_info_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.close_dialog(),
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => self.restart(),
            _ => {}
        }
    }

    fn on_name_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.close_dialog(),
            KeyCode::Enter => {
                let name = self.name_input.clone();
                self.set_name(&name);
                self.close_dialog();
            }
            KeyCode::Backspace => {
                self.name_input.pop();
            }
            KeyCode::Char(c) if self.name_input.chars().count() < MAX_NAME_LEN => {
                self.name_input.push(c);
            }
            _ => {}
        }
    }

    fn on_timer_key(&mut self, key: KeyEvent) {
        let form = &mut self.timer_form;
        match key.code {
            KeyCode::Esc => self.close_dialog(),
            KeyCode::Enter => {
                let countdown = form.to_countdown();
                self.apply_countdown(countdown);
                self.close_dialog();
            }
            KeyCode::Tab => form.focus = form.focus.next(),
            KeyCode::BackTab => form.focus = form.focus.prev(),
            KeyCode::Backspace => form.pop(),
            KeyCode::Char(' ') => form.enabled = !form.enabled,
            KeyCode::Char(c) => {
                form.push_digit(c);
            }
            _ => {}
        }
    }

    fn open_menu(&mut self) {
        self.menu = match self
            .remembered
            .as_ref()
            .and_then(|id| self.catalog.position(id))
        {
            Some((folder, entry)) => MenuState {
                level: MenuLevel::Entries,
                folder,
                entry,
            },
            None => MenuState::default(),
        };
        self.screen = Screen::ArticleMenu;
    }

    fn menu_len(&self) -> usize {
        match self.menu.level {
            MenuLevel::Folders => self.catalog.folders.len(),
            MenuLevel::Entries => self
                .catalog
                .folders
                .get(self.menu.folder)
                .map_or(0, |f| f.entries.len()),
        }
    }

    fn menu_selected_mut(&mut self) -> &mut usize {
        match self.menu.level {
            MenuLevel::Folders => &mut self.menu.folder,
            MenuLevel::Entries => &mut self.menu.entry,
        }
    }

    fn on_menu_key(&mut self, key: KeyEvent) {
        let len = self.menu_len();
        match key.code {
            KeyCode::Esc => self.close_dialog(),
            KeyCode::Up | KeyCode::Char('k') => {
                let selected = self.menu_selected_mut();
                *selected = selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let selected = self.menu_selected_mut();
                if *selected + 1 < len {
                    *selected += 1;
                }
            }
            KeyCode::Char('r') => {
                self.open_random();
            }
            KeyCode::Left | KeyCode::Backspace if self.menu.level == MenuLevel::Entries => {
                self.menu.level = MenuLevel::Folders;
            }
            KeyCode::Enter | KeyCode::Right => match self.menu.level {
                MenuLevel::Folders if len > 0 => {
                    self.menu.level = MenuLevel::Entries;
                    self.menu.entry = 0;
                }
                MenuLevel::Entries => {
                    let id = self
                        .catalog
                        .folders
                        .get(self.menu.folder)
                        .and_then(|f| f.entries.get(self.menu.entry))
                        .map(|e| e.id.clone());
                    if let Some(id) = id {
                        self.open_article(&id);
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }
}
