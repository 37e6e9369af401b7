use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use dazi::{
    app::App,
    app_dirs::AppDirs,
    article::{ArticleId, ArticleSource, BundledArticles, DirArticles},
    config::FilePreferencesStore,
    countdown::Countdown,
    history::{HistoryLog, HistoryRecord},
    logging,
    runtime::{CrosstermEventSource, FixedTicker, Runner, TypingEvent},
    TICK_RATE_MS,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
    time::Duration,
};
use tracing::{info, warn};

/// Rows shown by `--history`.
const HISTORY_ROWS: usize = 20;

/// typing practice in the terminal with live per-character feedback
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type through bundled or custom texts with live per-character coloring, an optional countdown, and statistics for every session."
)]
pub struct Cli {
    /// your name, shown in statistics and saved for next time
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// countdown as H:M:S, M:S or seconds; enables the countdown
    #[clap(short = 't', long)]
    timer: Option<Countdown>,

    /// turn the countdown off
    #[clap(long, conflicts_with = "timer")]
    no_countdown: bool,

    /// article to open, as Folder/NN_title.txt
    #[clap(short = 'a', long, conflicts_with_all = ["prompt", "random"])]
    article: Option<ArticleId>,

    /// custom text to practice
    #[clap(short = 'p', long, conflicts_with = "random")]
    prompt: Option<String>,

    /// open a random article
    #[clap(long)]
    random: bool,

    /// read articles from this directory instead of the bundled ones
    #[clap(long, value_name = "DIR")]
    texts_dir: Option<PathBuf>,

    /// print recent sessions and exit
    #[clap(long)]
    history: bool,
}

impl Cli {
    fn article_source(&self) -> Box<dyn ArticleSource> {
        match &self.texts_dir {
            Some(dir) => Box::new(DirArticles::new(dir)),
            None => Box::new(BundledArticles),
        }
    }
}

/// Command-line name and timer win over stored preferences and are saved.
fn apply_overrides(app: &mut App, cli: &Cli) {
    if let Some(name) = &cli.name {
        app.set_name(name);
    }
    if let Some(countdown) = cli.timer {
        app.apply_countdown(countdown);
    } else if cli.no_countdown {
        app.apply_countdown(app.prefs.countdown.with_enabled(false));
    }
}

/// Loads the text the session starts with. A failed `--article` falls back to
/// the first article and keeps the failure visible.
fn open_initial(app: &mut App, cli: &Cli) {
    if let Some(prompt) = &cli.prompt {
        app.load_custom(prompt);
        return;
    }
    if cli.random && app.open_random() {
        return;
    }
    if let Some(id) = &cli.article {
        if app.open_article(id) {
            return;
        }
        let notice = app.notice.take();
        app.open_first();
        app.notice = notice;
        return;
    }
    app.open_first();
}

fn format_history_row(record: &HistoryRecord) -> String {
    format!(
        "{}  {:<12} {:<24} {:>5} cpm  {:>6}% acc  {:>5}/{:<5}  {}",
        record.date,
        if record.name.is_empty() {
            "-"
        } else {
            record.name.as_str()
        },
        record.article,
        record.speed,
        record.accuracy,
        record.typed,
        record.total,
        record.reason,
    )
}

fn print_history(log: &HistoryLog, out: &mut impl Write) -> Result<(), Box<dyn Error>> {
    let records = log.recent(HISTORY_ROWS)?;
    if records.is_empty() {
        writeln!(out, "no sessions recorded in {}", log.path().display())?;
        return Ok(());
    }
    for record in &records {
        writeln!(out, "{}", format_history_row(record))?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Err(err) = logging::init(&AppDirs::log_path()) {
        eprintln!("dazi: logging disabled: {err}");
    }

    let history = HistoryLog::new();
    if cli.history {
        return print_history(&history, &mut io::stdout().lock());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(
        cli.article_source(),
        Box::new(FilePreferencesStore::new()),
        Some(history),
    );
    apply_overrides(&mut app, &cli);
    open_initial(&mut app, &cli);
    info!(article = %app.session.article(), "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        warn!(%err, "event loop failed");
    }
    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    while !app.should_quit() {
        match runner.step() {
            TypingEvent::Tick => app.on_tick(),
            TypingEvent::Resize => {}
            TypingEvent::Key(key) => app.handle_key(key),
        }
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    Ok(())
}
