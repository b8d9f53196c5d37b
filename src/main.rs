//! hemodesk - a terminal client for a blood donation management service.
//!
//! Provides a fast, keyboard-driven interface to donor profiles, blood
//! bank inventories, donation and request records, with admin review
//! actions for the accounts that carry them.

mod api;
mod app;
mod auth;
mod config;
mod models;
mod ui;
mod utils;

use std::io;
use std::io::Write as _;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use models::{NewUser, Role};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Initialize the tracing subscriber for logging.
///
/// Logs go to a file in the cache directory so they never corrupt the
/// alternate-screen TUI. RUST_LOG controls the filter (default: warn).
/// The returned guard must stay alive for the duration of the program.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = config::Config::default()
        .cache_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("."));
    let appender = tracing_appender::rolling::never(log_dir, "hemodesk.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--register" {
        return register_interactive().await;
    }
    if args.len() > 1 && args[1] == "--export-donations" {
        return export_csv(ExportKind::Donations).await;
    }
    if args.len() > 1 && args[1] == "--export-requests" {
        return export_csv(ExportKind::Requests).await;
    }
    if args.len() > 1 && args[1] == "--donate" {
        return record_donation(&args[2..]).await;
    }
    if args.len() > 1 && args[1] == "--request" {
        return record_request(&args[2..]).await;
    }
    if args.len() > 1 && args[1] == "--set-profile" {
        return set_donor_profile(&args[2..]).await;
    }

    // Initialize logging
    let _log_guard = init_tracing();
    info!("hemodesk starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app
    let mut app = App::new()?;

    // A persisted token pair skips the login overlay; a stale one gets
    // refreshed (or bounced back to login) by the first request
    if app.is_authenticated() {
        app.refresh_all_background();
    } else {
        app.start_login();
    }

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

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
    }

    info!("hemodesk shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

/// Build an API client from the stored config and token pair, outside
/// the TUI. Used by the CLI subcommands.
fn cli_client() -> Result<api::ApiClient> {
    let config = config::Config::load().unwrap_or_default();
    let cache_dir = config
        .cache_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("./cache"));
    let mut tokens = auth::TokenStore::new(cache_dir);
    tokens.load()?;
    let tokens = Arc::new(Mutex::new(tokens));
    api::ApiClient::new(&config.server_url(), tokens)
        .map_err(|e| anyhow::anyhow!("Failed to create API client: {}", e))
}

/// Prompt on stdin/stderr for a new account and create it.
async fn register_interactive() -> Result<()> {
    let client = cli_client()?;

    let username = prompt_line("Username: ")?;
    let email = prompt_line("Email: ")?;
    let role = loop {
        let role = prompt_line("Role (donor/hospital): ")?;
        match role.to_lowercase().as_str() {
            "donor" | "" => break Role::Donor,
            "hospital" => break Role::Hospital,
            _ => eprintln!("Please enter 'donor' or 'hospital'."),
        }
    };
    let password = rpassword::prompt_password("Password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }

    let new_user = NewUser {
        username: username.clone(),
        email,
        password,
        role,
        first_name: None,
        last_name: None,
    };

    client
        .register(&new_user)
        .await
        .context("Registration failed")?;

    eprintln!("Account '{}' created. Run hemodesk to log in.", username);
    Ok(())
}

enum ExportKind {
    Donations,
    Requests,
}

/// Fetch a CSV export with the stored session and print it to stdout.
async fn export_csv(kind: ExportKind) -> Result<()> {
    let client = cli_client()?;
    if !client.is_authenticated() {
        anyhow::bail!("No saved session. Run hemodesk and log in first.");
    }

    let csv = match kind {
        ExportKind::Donations => client.export_donations_csv().await,
        ExportKind::Requests => client.export_blood_requests_csv().await,
    }
    .context("Export failed")?;

    io::stdout().write_all(csv.as_bytes())?;
    Ok(())
}

fn parse_group_units(args: &[String]) -> Result<(models::BloodGroup, u32)> {
    let [group, units] = args else {
        anyhow::bail!("Expected: <blood-group> <units> (e.g. O- 1)");
    };
    let group = models::BloodGroup::parse(group)
        .ok_or_else(|| anyhow::anyhow!("Unknown blood group '{}'", group))?;
    let units: u32 = units.parse().context("Units must be a positive number")?;
    if units == 0 {
        anyhow::bail!("Units must be at least 1");
    }
    Ok((group, units))
}

/// Record a donation with the stored session: `--donate O- 1`.
async fn record_donation(args: &[String]) -> Result<()> {
    let (blood_group, units) = parse_group_units(args)?;
    let client = cli_client()?;
    if !client.is_authenticated() {
        anyhow::bail!("No saved session. Run hemodesk and log in first.");
    }

    let donation = client
        .create_donation(&models::NewDonation {
            blood_group,
            units,
            blood_bank: None,
        })
        .await
        .context("Failed to record donation")?;

    eprintln!(
        "Donation #{} recorded ({} x {} units), awaiting admin approval.",
        donation.id, donation.blood_group, donation.units
    );
    Ok(())
}

/// File a blood request with the stored session: `--request AB+ 2`.
async fn record_request(args: &[String]) -> Result<()> {
    let (blood_group, units) = parse_group_units(args)?;
    let client = cli_client()?;
    if !client.is_authenticated() {
        anyhow::bail!("No saved session. Run hemodesk and log in first.");
    }

    let request = client
        .create_blood_request(&models::NewBloodRequest { blood_group, units })
        .await
        .context("Failed to file blood request")?;

    eprintln!(
        "Request #{} filed ({} x {} units), status: {}.",
        request.id, request.blood_group, request.units, request.status
    );
    Ok(())
}

/// Create or update the caller's donor profile: `--set-profile O- [city]`.
async fn set_donor_profile(args: &[String]) -> Result<()> {
    let (group_arg, city) = match args {
        [group] => (group, None),
        [group, city] => (group, Some(city.clone())),
        _ => anyhow::bail!("Expected: <blood-group> [city]"),
    };
    let blood_group = models::BloodGroup::parse(group_arg)
        .ok_or_else(|| anyhow::anyhow!("Unknown blood group '{}'", group_arg))?;

    let client = cli_client()?;
    if !client.is_authenticated() {
        anyhow::bail!("No saved session. Run hemodesk and log in first.");
    }

    let me = client.current_user().await.context("Failed to fetch account")?;
    let existing = client
        .list_donor_profiles(None, None)
        .await
        .context("Failed to list donor profiles")?
        .into_iter()
        .find(|p| p.user.id == me.id);

    let payload = models::NewDonorProfile {
        blood_group,
        phone: None,
        city,
        last_donated: None,
        available: true,
    };

    let profile = match existing {
        Some(profile) => client
            .update_donor_profile(profile.id, &payload)
            .await
            .context("Failed to update donor profile")?,
        None => client
            .create_donor_profile(&payload)
            .await
            .context("Failed to create donor profile")?,
    };

    eprintln!(
        "Donor profile saved: {} / {} / available.",
        profile.blood_group,
        profile.city_or_dash()
    );
    Ok(())
}

fn prompt_line(prompt: &str) -> Result<String> {
    eprint!("{}", prompt);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
