//! sportline - a command-line client for the sportline event platform.
//!
//! Browse public events, manage your registrations, and record results
//! without leaving the terminal. Authentication state persists between
//! invocations; expired access tokens are renewed transparently.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sportline_core::models::{NewLocation, RegistrationRequest, UserUpdate};
use sportline_core::{ApiClient, Config, CredentialStore, EventFeed, SessionStore};

#[derive(Parser)]
#[command(name = "sportline", version, about = "Browse and join sport events from the terminal")]
struct Cli {
    /// API base URL (overrides the config file and SPORTLINE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session
    Login {
        /// Account email; defaults to the last one used
        #[arg(long)]
        email: Option<String>,
        /// Remember the password in the OS keychain
        #[arg(long)]
        remember: bool,
    },
    /// Create a new account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        display_name: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Change the signed-in user's display name
    Rename { display_name: String },
    /// List public events
    Events {
        /// Filter by sport type id; repeatable
        #[arg(long = "sport-type")]
        sport_types: Vec<i64>,
        /// Filter by event type id; repeatable
        #[arg(long = "event-type")]
        event_types: Vec<i64>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one event in detail
    Event { id: i64 },
    /// List sport types and event types
    Catalog,
    /// Add a location to the shared catalog
    AddLocation {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        city: String,
    },
    /// Register for an event
    Join {
        event_id: i64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Withdraw from an event
    Leave { event_id: i64 },
    /// List your registrations
    Registrations,
    /// Show results recorded for an event
    Results { event_id: i64 },
}

/// Initialize the tracing subscriber for logging.
/// Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    let base_url = cli.api_url.clone().unwrap_or_else(|| config.api_url());

    let session = Arc::new(SessionStore::open(Config::data_dir()?)?);
    let client = ApiClient::new(base_url, Arc::clone(&session))?;

    match cli.command {
        Command::Login { email, remember } => login(&client, &mut config, email, remember).await,
        Command::Register {
            email,
            display_name,
        } => register(&client, &mut config, email, display_name).await,
        Command::Logout => logout(&client, &config),
        Command::Whoami => whoami(&client).await,
        Command::Rename { display_name } => rename(&client, display_name).await,
        Command::Events {
            sport_types,
            event_types,
            city,
            search,
        } => list_events(&client, sport_types, event_types, city, search).await,
        Command::Event { id } => show_event(&client, id).await,
        Command::Catalog => catalog(&client).await,
        Command::AddLocation {
            name,
            address,
            city,
        } => add_location(&client, name, address, city).await,
        Command::Join { event_id, notes } => join(&client, event_id, notes).await,
        Command::Leave { event_id } => leave(&client, event_id).await,
        Command::Registrations => registrations(&client).await,
        Command::Results { event_id } => results(&client, event_id).await,
    }
}

async fn login(
    client: &ApiClient,
    config: &mut Config,
    email: Option<String>,
    remember: bool,
) -> Result<()> {
    let email = match email.or_else(|| config.last_email.clone()) {
        Some(email) => email,
        None => prompt("Email: ")?,
    };

    let password = match CredentialStore::password(&email) {
        Ok(saved) => {
            info!("Using remembered password from keychain");
            saved
        }
        Err(_) => rpassword::prompt_password("Password: ")?,
    };

    let auth = client.login(&email, &password).await?;
    println!("Signed in as {} <{}>", auth.user.display_name, auth.user.email);

    config.last_email = Some(email.clone());
    config.save()?;

    if remember {
        CredentialStore::remember(&email, &password)?;
        println!("Password remembered in the OS keychain");
    }
    Ok(())
}

async fn register(
    client: &ApiClient,
    config: &mut Config,
    email: String,
    display_name: String,
) -> Result<()> {
    let password = rpassword::prompt_password("Choose a password: ")?;
    let confirm = rpassword::prompt_password("Repeat it: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }

    let auth = client.register(&email, &display_name, &password).await?;
    println!("Account created, signed in as {}", auth.user.display_name);

    config.last_email = Some(email);
    config.save()?;
    Ok(())
}

fn logout(client: &ApiClient, config: &Config) -> Result<()> {
    client.logout()?;
    if let Some(ref email) = config.last_email {
        if CredentialStore::has_saved(email) {
            let _ = CredentialStore::forget(email);
        }
    }
    println!("Signed out");
    Ok(())
}

async fn whoami(client: &ApiClient) -> Result<()> {
    let user = client.current_user().await?;
    println!("{} <{}>", user.display_name, user.email);
    if user.is_staff {
        println!("role: staff");
    }
    Ok(())
}

async fn rename(client: &ApiClient, display_name: String) -> Result<()> {
    let update = UserUpdate {
        display_name: Some(display_name),
        ..UserUpdate::default()
    };
    let user = client.update_current_user(&update).await?;
    println!("You are now {}", user.display_name);
    Ok(())
}

async fn list_events(
    client: &ApiClient,
    sport_types: Vec<i64>,
    event_types: Vec<i64>,
    city: Option<String>,
    search: Option<String>,
) -> Result<()> {
    let mut feed = EventFeed::new(client.clone());
    for id in sport_types {
        feed.add_sport_type(id);
    }
    for id in event_types {
        feed.add_event_type(id);
    }
    feed.set_city(city);
    feed.set_search(search);

    let events = feed.refresh().await?;
    if events.is_empty() {
        println!("No events match");
        return Ok(());
    }

    for event in &events {
        println!(
            "#{:<5} {:<22} {:<32} {} / {}",
            event.id,
            event.formatted_start(),
            event.title,
            event.sport_type.name,
            event.event_type.name,
        );
    }
    println!("{} event(s)", events.len());
    Ok(())
}

async fn show_event(client: &ApiClient, id: i64) -> Result<()> {
    let event = client.event(id).await?;
    println!("{} (#{})", event.title, event.id);
    println!("  {}", event.description);
    println!("  when:  {}", event.formatted_start());
    println!("  where: {}", event.location_display());
    println!("  sport: {} / {}", event.sport_type.name, event.event_type.name);
    println!("  status: {}  organizer: {}", event.status, event.organizer.display_name);
    match event.spots_left() {
        Some(n) => println!(
            "  participants: {} ({} spot(s) left)",
            event.current_participants_count, n
        ),
        None => println!("  participants: {}", event.current_participants_count),
    }
    if let Some(ref fee) = event.entry_fee {
        println!("  entry fee: {fee}");
    }
    Ok(())
}

async fn catalog(client: &ApiClient) -> Result<()> {
    let sports = client.sport_types().await?;
    println!("Sport types:");
    for sport in &sports {
        println!("  {:<4} {}", sport.id, sport.name);
    }

    let kinds = client.event_types().await?;
    println!("Event types:");
    for kind in &kinds {
        println!("  {:<4} {}", kind.id, kind.name);
    }
    Ok(())
}

async fn add_location(
    client: &ApiClient,
    name: String,
    address: String,
    city: String,
) -> Result<()> {
    let location = client
        .create_location(&NewLocation {
            name,
            address,
            city,
            latitude: None,
            longitude: None,
            details: None,
        })
        .await?;
    println!("Created location #{}: {}", location.id, location.display_line());
    Ok(())
}

async fn join(client: &ApiClient, event_id: i64, notes: Option<String>) -> Result<()> {
    let request = RegistrationRequest {
        notes_by_user: notes,
        user_id: None,
    };
    let registration = client.register_for_event(event_id, &request).await?;
    println!(
        "Registered for \"{}\" ({})",
        registration.event.title, registration.status
    );
    Ok(())
}

async fn leave(client: &ApiClient, event_id: i64) -> Result<()> {
    client.unregister_from_event(event_id).await?;
    println!("Withdrawn from event #{event_id}");
    Ok(())
}

async fn registrations(client: &ApiClient) -> Result<()> {
    let registrations = client.my_registrations().await?;
    if registrations.is_empty() {
        println!("No registrations");
        return Ok(());
    }
    for registration in &registrations {
        println!(
            "#{:<5} {:<32} {:<10} {}",
            registration.event.id,
            registration.event.title,
            registration.status.to_string(),
            registration.event.formatted_start(),
        );
    }
    Ok(())
}

async fn results(client: &ApiClient, event_id: i64) -> Result<()> {
    let results = client.results(Some(event_id)).await?;
    if results.is_empty() {
        println!("No results recorded");
        return Ok(());
    }
    for result in &results {
        let position = result
            .position
            .map(|p| format!("{p}."))
            .unwrap_or_else(|| "-".to_string());
        let score = result.score.as_deref().unwrap_or("");
        println!("{:<4} {:<28} {}", position, result.subject(), score);
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
