mod app;
mod cli;
mod config;
mod datasources;
mod db;
mod error;
mod logic;
mod models;
mod store;
mod ui;

use app::{App, Screen};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use datasources::FarmApiClient;
use db::Database;
use error::{FieldOpsError, Result};
use logic::info::{recommend_insurance, SCHEMES, SENSOR_SETUP_STEPS};
use logic::resolve_stage;
use logic::stage_resolver::{next_stage, normalize_crop_type};
use logic::stage_table::{stages_for, DEFAULT_CROP_TYPE};
use models::{Crop, Farm, HealthDetection, ImageUpload};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use store::AppStore;
use tracing_subscriber::EnvFilter;
use ui::screens::{
    CropDetailScreen, DashboardScreen, HistoryScreen, RegisterScreen, SchemesScreen,
    SensorSetupScreen,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let data_dir = cli.data_dir.clone();

    match cli.command {
        Some(Commands::Init) => {
            init_logging(cli.verbose, None)?;
            Config::setup_interactive()?;
            Ok(())
        }
        Some(Commands::Check) => {
            init_logging(cli.verbose, None)?;
            run_check(cli.config, data_dir.as_ref()).await
        }
        Some(Commands::Stage { crop_type, days }) => {
            init_logging(cli.verbose, None)?;
            print_stage(&crop_type, days);
            Ok(())
        }
        Some(Commands::History { crop_id }) => {
            init_logging(cli.verbose, None)?;
            print_history(data_dir.as_ref(), crop_id)
        }
        Some(Commands::Detect { crop_id, image }) => {
            init_logging(cli.verbose, None)?;
            run_detect(data_dir.as_ref(), crop_id, &image)
        }
        None => run_tui(cli.config, data_dir.as_ref(), cli.verbose).await,
    }
}

/// Log to stderr, or to `log_file` while the TUI owns the terminal.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

fn open_store(data_dir: Option<&PathBuf>) -> Result<AppStore> {
    let db = Database::open(&Config::db_path(data_dir)?)?;
    AppStore::load(db)
}

async fn run_check(config_path: Option<PathBuf>, data_dir: Option<&PathBuf>) -> Result<()> {
    let config = Config::load(config_path)?;
    println!("Config OK");
    println!("  API: {:?}", config.api);
    println!(
        "  Sensor refresh: every {}s",
        config.sensors.refresh_interval().as_secs()
    );
    match &config.profile {
        Some(p) => println!("  Profile: {} ({})", p.display_name(), p.email),
        None => println!("  Profile: not signed in"),
    }

    let db_path = Config::db_path(data_dir)?;
    let store = AppStore::load(Database::open(&db_path)?)?;
    println!(
        "Database OK: {} ({} farms, {} crops)",
        db_path.display(),
        store.farms().len(),
        store.crops().len()
    );
    for farm in store.farms() {
        println!("  {}: {} crops", farm.name, store.crops_for_farm(farm.id).len());
    }

    if !config.api.enabled {
        println!("Farm API: disabled");
        return Ok(());
    }

    let client = FarmApiClient::new(config.api.clone())?;
    match client.test_connection().await {
        Ok(true) => println!("Farm API: OK ({})", config.api.url),
        Ok(false) => println!("Farm API: reachable but returned a server error"),
        Err(e) => println!("Farm API: OFFLINE - {}", e),
    }
    Ok(())
}

fn print_stage(crop_type: &str, days: i64) {
    let normalized = normalize_crop_type(crop_type);
    let table = if stages_for(&normalized).is_some() {
        normalized.as_str()
    } else {
        DEFAULT_CROP_TYPE
    };
    let stage = resolve_stage(crop_type, days);

    println!("{} at day {} ({} stages)", crop_type, days, table);
    println!("{}", stage);
    println!("  {}", stage.description);
    for task in stage.tasks {
        println!("  - {}", task);
    }
    println!("  Irrigation: {}", stage.irrigation);
    if let Some(fert) = stage.fertilization {
        println!("  Fertilization: {}", fert);
    }
    if !stage.pest_watch.is_empty() {
        println!("  Watch for: {}", stage.pest_watch.join(", "));
    }
    if let Some(next) = next_stage(crop_type, days) {
        println!("Next: {} from day {}", next.stage_name, next.day_start);
    }
}

fn print_history(data_dir: Option<&PathBuf>, crop_id: i64) -> Result<()> {
    let store = open_store(data_dir)?;
    let crop = store
        .get_crop(crop_id)
        .ok_or_else(|| FieldOpsError::NotFound(format!("crop {}", crop_id)))?;

    let history = store.crop_history(crop_id);
    println!("{} ({}) - {} entries", crop.name, crop.crop_type, history.len());
    for entry in history {
        println!(
            "{}  {:<14} moisture {:>5.1}%  pH {:.1}  NPK {:>5.0}  {}  {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.action_taken.as_str(),
            entry.sensors.moisture,
            entry.sensors.ph,
            entry.sensors.npk,
            entry.outcome.as_str(),
            entry.ai_recommendation
        );
    }
    Ok(())
}

fn run_detect(data_dir: Option<&PathBuf>, crop_id: i64, image: &Path) -> Result<()> {
    let upload = ImageUpload::from_path(image)?;
    let detection = HealthDetection::pending(crop_id, &upload)?;

    let mut store = open_store(data_dir)?;
    let id = store.add_health_detection(detection)?;
    let total = store
        .health_detections()
        .iter()
        .filter(|d| d.crop_id == crop_id)
        .count();

    println!(
        "Recorded {} for crop {} as detection #{} (pending analysis, {} on file for this crop)",
        upload.file_name, crop_id, id, total
    );
    Ok(())
}

async fn run_tui(
    config_path: Option<PathBuf>,
    data_dir: Option<&PathBuf>,
    verbose: u8,
) -> Result<()> {
    let config = if Config::exists(config_path.as_ref()) {
        Config::load(config_path)?
    } else {
        let (config, _) = Config::setup_interactive()?;
        config
    };

    init_logging(verbose, Some(&Config::log_path(data_dir)?))?;
    tracing::info!(?config, "Starting FieldOps");

    let store = open_store(data_dir)?;
    let mut app = App::new(config, store)?;
    app.set_status("Select a crop and press Enter to open it");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        // Short poll keeps sensor ticks and API replies flowing
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.quit();
                    }
                    KeyCode::Char('q') if !app.is_editing() => {
                        app.quit();
                    }
                    KeyCode::Esc if !app.is_editing() => {
                        app.switch_screen(Screen::Dashboard);
                    }
                    KeyCode::Char(c) if !app.is_editing() => {
                        if let Some(screen) = Screen::from_key(c) {
                            app.switch_screen(screen);
                        } else {
                            handle_screen_input(app, key.code, key.modifiers);
                        }
                    }
                    _ => {
                        handle_screen_input(app, key.code, key.modifiers);
                    }
                }
            }
        }

        app.tick();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let today = chrono::Local::now().date_naive();
    let status = app.status_message.as_deref();
    let error = app.error_message.as_deref();

    match app.screen {
        Screen::Dashboard => {
            let controls = app
                .selected_crop()
                .map(|c| app.store.controls(c.id))
                .unwrap_or_default();
            let screen = DashboardScreen::new(app.store.farms(), app.store.crops(), today)
                .with_selection(app.dashboard_state.selected_index, controls)
                .with_profile(app.store.profile())
                .api_enabled(app.api.is_some())
                .with_status(status, error);
            f.render_widget(screen, area);
        }
        Screen::CropDetail => {
            let Some(view) = app.crop_view.as_ref() else {
                return;
            };
            // A missing crop still renders, under a placeholder
            let crop = app
                .store
                .get_crop(view.crop_id)
                .cloned()
                .unwrap_or_else(|| Crop::placeholder(view.crop_id));
            let farm = app
                .store
                .get_farm(crop.farm_id)
                .cloned()
                .unwrap_or_else(|| Farm::placeholder(crop.farm_id));

            let days = crop.days_since_planting(today);
            let monitor = view.monitor.as_ref();
            let screen = CropDetailScreen::new(
                &crop,
                &farm,
                days,
                resolve_stage(&crop.crop_type, days),
                next_stage(&crop.crop_type, days),
            )
            .with_sensors(
                monitor.and_then(|m| m.latest_snapshot()),
                monitor.and_then(|m| m.latest_decision()),
                monitor.is_some(),
            )
            .with_controls(app.store.controls(crop.id))
            .with_api(
                app.api.is_some(),
                view.prediction.as_ref(),
                &view.valves,
                app.tracker.outstanding().map(|t| t.kind),
                view.rain_forecast,
            )
            .with_history(app.store.crop_history(crop.id))
            .with_status(status, error);
            f.render_widget(screen, area);
        }
        Screen::History => {
            let Some(crop_id) = app.history_crop else {
                return;
            };
            let crop = app
                .store
                .get_crop(crop_id)
                .cloned()
                .unwrap_or_else(|| Crop::placeholder(crop_id));
            let screen = HistoryScreen::new(&crop, app.store.crop_history(crop_id))
                .with_scroll(app.history_state.scroll);
            f.render_widget(screen, area);
        }
        Screen::Register => {
            let farm_names: Vec<String> =
                app.store.farms().iter().map(|f| f.name.clone()).collect();
            let screen =
                RegisterScreen::new(&app.register_state, &farm_names).with_status(status, error);
            f.render_widget(screen, area);
        }
        Screen::Schemes => {
            let mut screen =
                SchemesScreen::new(SCHEMES).with_selection(app.schemes_state.selected_index);
            if let Some(crop) = app.selected_crop() {
                let plan = recommend_insurance(&crop.crop_type);
                screen = screen.with_insurance(&crop.crop_type, plan);
            }
            f.render_widget(screen, area);
        }
        Screen::SensorSetup => {
            f.render_widget(SensorSetupScreen::new(SENSOR_SETUP_STEPS), area);
        }
    }
}

fn handle_screen_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match app.screen {
        Screen::Dashboard => handle_dashboard_input(app, code),
        Screen::CropDetail => handle_crop_detail_input(app, code),
        Screen::History => handle_history_input(app, code),
        Screen::Register => handle_register_input(app, code, modifiers),
        Screen::Schemes => handle_schemes_input(app, code),
        Screen::SensorSetup => {}
    }
}

fn handle_dashboard_input(app: &mut App, code: KeyCode) {
    let count = app.store.crops().len();
    match code {
        KeyCode::Up => app.dashboard_state.prev(),
        KeyCode::Down => app.dashboard_state.next(count),
        KeyCode::Enter => app.open_selected_crop(),
        KeyCode::Char('h') => app.open_history(),
        _ => {}
    }
}

fn handle_crop_detail_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('i') => app.toggle_irrigation(),
        KeyCode::Char('f') => app.toggle_fertilization(),
        KeyCode::Char('r') => app.toggle_rain_forecast(),
        KeyCode::Char('h') => app.open_history(),
        // Request keys are ignored while one is outstanding
        KeyCode::Char(_) if app.tracker.is_busy() => {}
        KeyCode::Char('p') => app.request_prediction(),
        KeyCode::Char('y') => app.send_feedback(true),
        KeyCode::Char('n') => app.send_feedback(false),
        KeyCode::Char('v') => app.refresh_valves(),
        KeyCode::Char('o') => app.toggle_valve(),
        KeyCode::Char('O') => app.override_valve(),
        _ => {}
    }
}

fn handle_history_input(app: &mut App, code: KeyCode) {
    let count = app
        .history_crop
        .map(|id| app.store.crop_history(id).len())
        .unwrap_or(0);
    match code {
        KeyCode::Up => app.history_state.up(),
        KeyCode::Down => app.history_state.down(count),
        _ => {}
    }
}

fn handle_schemes_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Up => app.schemes_state.prev(),
        KeyCode::Down => app.schemes_state.next(SCHEMES.len()),
        _ => {}
    }
}

fn handle_register_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if !app.register_state.editing
        && code == KeyCode::Char('s')
        && modifiers.contains(KeyModifiers::CONTROL)
    {
        app.submit_registration();
        return;
    }

    let farm_count = app.store.farms().len();
    let form = &mut app.register_state;

    if form.editing {
        match code {
            KeyCode::Esc => form.cancel_editing(),
            KeyCode::Enter => form.finish_editing(),
            KeyCode::Backspace => {
                form.edit_buffer.pop();
            }
            KeyCode::Char(c) => form.edit_buffer.push(c),
            _ => {}
        }
        return;
    }

    let on_select = form.focused_field().is_select();
    match code {
        KeyCode::Up => form.prev_field(),
        KeyCode::Down | KeyCode::Tab => form.next_field(),
        KeyCode::Enter => form.start_editing(),
        KeyCode::Left if on_select => form.cycle_farm(false, farm_count),
        KeyCode::Right if on_select => form.cycle_farm(true, farm_count),
        KeyCode::Char('t') => form.toggle_kind(),
        _ => {}
    }
}
