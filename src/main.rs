use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use formcoach::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{
        spawn_terminal_input, ChannelEventSource, FixedTicker, Runner, SessionEvent,
        SessionEventSource, Ticker,
    },
    schedule::ThreadScheduler,
    transport::{Connection, TcpTransport},
    ui::SessionView,
    ExerciseKind, ExerciseSession, SessionConfig,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs,
    io::{self, stdin},
    path::PathBuf,
    sync::{mpsc, Mutex},
    time::Duration,
};
use tracing_subscriber::EnvFilter;

const REDRAW_INTERVAL_MS: u64 = 250;

/// terminal workout coach with timed sets and live rep counting
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Guides you through timed sets and rest periods while a pose-tracking server streams your rep count, status and form corrections."
)]
pub struct Cli {
    /// exercise to track, e.g. squat, pushup or left-bicep (see --list)
    exercise: Option<String>,

    /// address of the tracking server (host:port)
    #[clap(short = 's', long)]
    server: Option<String>,

    /// base url the annotated video feeds are served from
    #[clap(long)]
    feed_url: Option<String>,

    /// length of an active set in seconds
    #[clap(short = 'a', long, value_parser = clap::value_parser!(u32).range(1..))]
    active_secs: Option<u32>,

    /// length of a rest period in seconds
    #[clap(short = 'r', long, value_parser = clap::value_parser!(u32).range(1..))]
    rest_secs: Option<u32>,

    /// start the next countdown as soon as the previous phase ends
    #[clap(long)]
    auto_advance: bool,

    /// list the supported exercises and exit
    #[clap(long)]
    list: bool,

    /// persist the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,

    /// write logs to this file instead of the state directory
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Overlay command line flags on the stored configuration
    fn apply(&self, config: &mut Config) {
        if let Some(server) = &self.server {
            config.server_addr = server.clone();
        }
        if let Some(feed_url) = &self.feed_url {
            config.feed_base_url = feed_url.clone();
        }
        if let Some(secs) = self.active_secs {
            config.active_secs = secs;
        }
        if let Some(secs) = self.rest_secs {
            config.rest_secs = secs;
        }
        if self.auto_advance {
            config.auto_start_next_phase = true;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    // before the config load, so a bad config file gets reported
    init_logging(cli.log_file.clone().or_else(AppDirs::log_path));

    if cli.list {
        for kind in ExerciseKind::ALL {
            println!("{:<18} {}", kind.key(), kind.title());
        }
        return Ok(());
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    cli.apply(&mut config);
    if cli.save_config {
        store.save(&config)?;
        tracing::info!(path = %store.path().display(), "saved config");
    }

    let Some(exercise) = cli.exercise.as_deref() else {
        let mut cmd = Cli::command();
        cmd.error(
            ErrorKind::MissingRequiredArgument,
            "an exercise is required (see --list)",
        )
        .exit();
    };

    let (tx, rx) = mpsc::channel();
    let mut connection = Connection::new(TcpTransport::new(config.server_addr.clone(), tx.clone()));
    tracing::info!(server = connection.transport().addr(), %exercise, "starting session");
    let scheduler = ThreadScheduler::new(tx.clone());

    let mut session = match ExerciseSession::mount(
        exercise,
        SessionConfig::from(&config),
        &mut connection,
        scheduler,
    ) {
        Ok(session) => session,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, err).exit();
        }
    };

    if !stdin().is_tty() {
        session.unmount();
        connection.teardown();
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let feed_url = session.exercise().feed_url(&config.feed_base_url);
    let runner = Runner::new(
        ChannelEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(REDRAW_INTERVAL_MS)),
    );

    enable_raw_mode()?;
    spawn_terminal_input(tx);

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut session, &runner, &feed_url);

    session.unmount();
    connection.teardown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: SessionEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    session: &mut ExerciseSession<'_, TcpTransport, ThreadScheduler>,
    runner: &Runner<E, T>,
    feed_url: &str,
) -> Result<(), Box<dyn Error>> {
    loop {
        let snapshot = session.snapshot();
        terminal.draw(|f| f.render_widget(SessionView::new(&snapshot, feed_url), f.area()))?;

        match runner.step() {
            SessionEvent::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    break;
                }
                match key.code {
                    KeyCode::Esc | KeyCode::Char('q') => break,
                    KeyCode::Char(' ') => session.toggle_timer(),
                    KeyCode::Char('r') => session.reset_timer(),
                    KeyCode::Char('c') => {
                        session.reconnect();
                    }
                    _ => {}
                }
            }
            SessionEvent::Tick(id) => {
                session.on_tick(id);
            }
            SessionEvent::Frame(frame) => {
                session.on_frame(&frame);
            }
            SessionEvent::Disconnected(reason) => session.on_disconnect(&reason),
            SessionEvent::Resize | SessionEvent::Idle => {}
        }
    }

    Ok(())
}

/// Log to a file; the terminal belongs to the UI
fn init_logging(path: Option<PathBuf>) {
    let Some(path) = path else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = fs::OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}
