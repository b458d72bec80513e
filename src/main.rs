use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    Terminal,
};
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use aeropulse::app::{DEFAULT_UNIT_ID, MAX_UNIT_ID, MIN_UNIT_ID};
use aeropulse::data::report::DEFAULT_REPORT_FILE;
use aeropulse::ui::{self, Theme};
use aeropulse::{
    events, ApiClient, App, Backend, DataSource, EngineControl, FileSource, Report, Session,
    Settings, TokenStore, View, WebSocketSource,
};

#[derive(Parser, Debug)]
#[command(name = "aeropulse")]
#[command(about = "Terminal dashboard for turbofan engine telemetry and RUL predictions")]
struct Args {
    /// Backend base URL; the telemetry socket is read from <url>/ws
    #[arg(short, long)]
    url: Option<String>,

    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replay a recorded session (newline-delimited JSON frames) instead of connecting
    #[arg(short, long, conflicts_with_all = ["login", "logout", "upload"])]
    replay: Option<PathBuf>,

    /// Engine unit to stream on start (1-100)
    #[arg(short, long, conflicts_with = "replay")]
    engine: Option<u32>,

    /// Log in as this user and store the token
    #[arg(long, conflicts_with_all = ["logout", "upload"])]
    login: Option<String>,

    /// Password for --login
    #[arg(long, env = "AEROPULSE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Forget the stored token
    #[arg(long, conflicts_with = "upload")]
    logout: bool,

    /// Upload a C-MAPSS test file for batch RUL analysis
    #[arg(long)]
    upload: Option<PathBuf>,

    /// Where the batch analysis CSV is written
    #[arg(long, default_value = DEFAULT_REPORT_FILE)]
    report: PathBuf,

    /// Open the dashboard with the analysis loaded after --upload
    #[arg(long, requires = "upload")]
    tui: bool,

    /// Log file used while the dashboard is open
    #[arg(long, default_value = "aeropulse.log")]
    log_file: PathBuf,
}

impl Args {
    fn opens_dashboard(&self) -> bool {
        self.login.is_none() && !self.logout && (self.upload.is_none() || self.tui)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.opens_dashboard().then_some(args.log_file.as_path()))?;

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(url) = &args.url {
        settings.base_url = url.clone();
    }

    let rt = Runtime::new()?;
    let backend: Arc<dyn Backend> = Arc::new(ApiClient::new(&settings.base_url)?);
    let store = TokenStore::default_location().context("No config directory for the token store")?;
    let mut session = Session::new(backend, store);

    if args.logout {
        session.logout()?;
        println!("Logged out");
        return Ok(());
    }

    if let Some(ref username) = args.login {
        let password = args
            .password
            .as_deref()
            .context("--password or AEROPULSE_PASSWORD is required with --login")?;
        let user = rt.block_on(session.login(username, password))?;
        println!("Logged in as {} ({}, {})", user.username, user.email, user.role);
        return Ok(());
    }

    let report = match args.upload {
        Some(ref path) => Some(rt.block_on(upload(&mut session, path, &args.report))?),
        None => None,
    };

    if !args.opens_dashboard() {
        return Ok(());
    }

    let token = if args.replay.is_none() {
        match rt.block_on(session.restore()) {
            Ok(_) => session.token().map(str::to_string),
            Err(e) => {
                tracing::warn!(error = %e, "Could not restore session");
                None
            }
        }
    } else {
        None
    };

    // Sources and engine requests spawn onto this runtime
    let _guard = rt.enter();

    let (source, engine): (Box<dyn DataSource>, Option<EngineControl>) = match args.replay {
        Some(ref path) => (
            Box::new(FileSource::new(path).with_interval(settings.replay_interval)),
            None,
        ),
        None => {
            let requested = args
                .engine
                .or(settings.unit_id)
                .map(|unit| unit.clamp(MIN_UNIT_ID, MAX_UNIT_ID));
            let mut control = EngineControl::new(
                rt.handle().clone(),
                Arc::clone(session.backend()),
                token,
                requested.unwrap_or(DEFAULT_UNIT_ID),
            );
            if let Some(unit) = requested {
                control.request(unit);
            }

            let url = settings.ws_url();
            (
                Box::new(WebSocketSource::connect(&url, settings.reconnect_policy())),
                Some(control),
            )
        }
    };

    let mut app = App::new(source, settings.thresholds())
        .with_retention(settings.retention)
        .with_sweep_interval(settings.sweep_interval)
        .with_theme(Theme::auto_detect())
        .with_report_path(&args.report);
    if let Some(engine) = engine {
        app = app.with_engine_control(engine);
    }
    if let Some(report) = report {
        app = app.with_report(report);
        app.set_view(View::Report);
    }

    run_tui(app)
}

/// Route logs to a file while the terminal is in raw mode, stderr otherwise.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                .init();
        }
    }
    Ok(())
}

/// Run a batch analysis and write the CSV report.
async fn upload(session: &mut Session, path: &Path, report_path: &Path) -> Result<Report> {
    if !session.restore().await? {
        anyhow::bail!("Not logged in; run with --login <username> first");
    }

    let contents =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.txt".to_string());

    let report = session.upload_test(&file_name, contents).await?;

    match report.stats() {
        Some(stats) => println!(
            "Analyzed {} engines: {} critical, {} warning, {} healthy, average RUL {:.1}",
            stats.total, stats.critical, stats.warning, stats.healthy, stats.average_rul
        ),
        None => println!("Analysis returned no engines"),
    }

    report.export_csv(report_path)?;
    println!("Report written to: {}", report_path.display());

    Ok(report)
}

/// Run the TUI until the user quits
fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let _ = app.reload_data();

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Five centered rows for the resize notice, clipped to tiny terminals.
fn too_small_message_area(area: Rect) -> Rect {
    let y = area.y + (area.height / 2).saturating_sub(2);
    let height = 5.min(area.height.saturating_sub(y - area.y));
    Rect::new(area.x, y, area.width, height)
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = too_small_message_area(area);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Sensors => ui::sensors::render(frame, app, chunks[2]),
                View::Alerts => ui::alerts::render(frame, app, chunks[2]),
                View::Trends => ui::trends::render(frame, app, chunks[2]),
                View::Report => ui::report::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Content starts after header (1) + tabs (1) + block border (1)
                    events::handle_mouse_event(app, mouse, 3);
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        // Frames are drained every iteration; the sweep runs on its own interval
        let _ = app.reload_data();
        let _ = app.tick();
    }

    Ok(())
}
