use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::mpsc;

mod app;
mod ui;

use app::App;
use coachflow::booking::{BookingContext, BookingStep, BookingWizard, Location, TimeSlot};
use coachflow::config::Config;
use coachflow::flow::Advance;
use coachflow::{host, logging};

#[derive(Parser)]
#[command(name = "coachflow")]
#[command(about = "Session booking and execution for personal trainers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List clients and services
    Catalog,

    /// Show bookable dates, or slot availability for one date
    Slots {
        /// Date to inspect (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Book a session without the TUI and print it as JSON
    Book {
        /// Client name, e.g. "Emma L."
        #[arg(long)]
        client: String,

        /// Service name, e.g. "Yoga Session"
        #[arg(long)]
        service: String,

        /// Session date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Start time (HH:MM)
        #[arg(long)]
        time: TimeSlot,

        /// Location label (default: Studio A)
        #[arg(long)]
        location: Option<Location>,

        /// Notes for the session
        #[arg(long)]
        notes: Option<String>,

        /// Equipment to bring; replaces the service's default list
        #[arg(long = "equipment")]
        equipment: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    // Determine if we're running in TUI mode (no subcommand)
    let is_tui_mode = cli.command.is_none();

    // Initialize logging (file-based for TUI, stderr for CLI)
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    let today = chrono::Local::now().date_naive();

    match cli.command {
        Some(Commands::Catalog) => {
            cmd_catalog(&config);
        }
        Some(Commands::Slots { date }) => {
            cmd_slots(&config, today, date)?;
        }
        Some(Commands::Book {
            client,
            service,
            date,
            time,
            location,
            notes,
            equipment,
        }) => {
            let ctx = host::booking_context(&config, today)?;
            let request = BookRequest {
                client,
                service,
                date,
                time,
                location,
                notes,
                equipment,
            };
            cmd_book(ctx, request)?;
        }
        None => {
            // No subcommand = launch TUI dashboard
            run_tui(config, logging_handle.log_file_path).await?;
        }
    }

    Ok(())
}

async fn run_tui(config: Config, log_file_path: Option<PathBuf>) -> Result<()> {
    let mut app = App::new(config)?;
    let result = app.run().await;

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

fn cmd_catalog(config: &Config) {
    println!("Clients ({})", config.catalog.clients.len());
    println!("{}", "─".repeat(60));
    for client in &config.catalog.clients {
        println!(
            "{:>3}  {:<12} {:<9} {:>3} sessions  last: {}",
            client.id,
            client.name,
            client.status.label(),
            client.total_sessions,
            client.last_session
        );
    }

    println!();
    println!("Services ({})", config.catalog.services.len());
    println!("{}", "─".repeat(60));
    for service in &config.catalog.services {
        println!(
            "{:>3}  {:<24} {:>3} min  ${:<4} {}",
            service.id, service.name, service.duration, service.price, service.category
        );
    }
}

fn cmd_slots(config: &Config, today: NaiveDate, date: Option<NaiveDate>) -> Result<()> {
    let ctx = host::booking_context(config, today)?;

    let Some(date) = date else {
        println!("Bookable dates ({} days)", ctx.window.days());
        println!("{}", "─".repeat(30));
        for date in ctx.window.dates() {
            println!("{}", date.format("%a %Y-%m-%d"));
        }
        return Ok(());
    };

    if !ctx.window.contains(date) {
        bail!(
            "{} is outside the booking window ({} to {})",
            date,
            ctx.window.start(),
            ctx.window.dates().last().copied().unwrap_or(ctx.window.start())
        );
    }

    println!("Slots for {}", date.format("%a %Y-%m-%d"));
    println!("{}", "─".repeat(30));
    for slot in &ctx.time_slots {
        let status = if ctx.availability.is_slot_available(date, *slot) {
            "available"
        } else {
            "unavailable"
        };
        println!("{}  {}", slot, status);
    }
    Ok(())
}

struct BookRequest {
    client: String,
    service: String,
    date: NaiveDate,
    time: TimeSlot,
    location: Option<Location>,
    notes: Option<String>,
    equipment: Vec<String>,
}

/// Continue, turning a closed gate into an error
fn advance(wizard: &mut BookingWizard) -> Result<()> {
    match wizard.next() {
        Advance::Moved { .. } | Advance::Complete => Ok(()),
        Advance::Blocked { step, reason } => bail!("Blocked at {}: {}", step, reason),
    }
}

fn cmd_book(ctx: BookingContext, request: BookRequest) -> Result<()> {
    let client = ctx
        .catalog
        .client_named(&request.client)
        .ok_or_else(|| anyhow!("Unknown client: {}", request.client))?
        .id;
    let service = ctx
        .catalog
        .service_named(&request.service)
        .ok_or_else(|| anyhow!("Unknown service: {}", request.service))?
        .id;

    let (tx, rx) = mpsc::channel();
    let mut wizard = host::start_booking_wizard(
        BookingStep::ClientSelection,
        ctx,
        || {},
        move |draft| {
            let _ = tx.send(draft);
        },
    );

    wizard.select_client(client)?;
    advance(&mut wizard)?;

    wizard.select_service(service)?;
    advance(&mut wizard)?;

    wizard.select_date(request.date)?;
    if !wizard.select_time(request.time)? {
        bail!("{} on {} is not available", request.time, request.date);
    }
    advance(&mut wizard)?;

    if let Some(location) = request.location {
        wizard.set_location(location)?;
    }
    if let Some(notes) = request.notes {
        wizard.set_notes(notes)?;
    }
    if !request.equipment.is_empty() {
        let current = wizard.draft().equipment.clone();
        for item in current.iter().filter(|item| !request.equipment.contains(item)) {
            wizard.toggle_equipment(item)?;
        }
        for item in request.equipment.iter().filter(|item| !current.contains(item)) {
            wizard.toggle_equipment(item)?;
        }
    }
    advance(&mut wizard)?;

    wizard
        .confirm()
        .map_err(|wizard| anyhow!("Booking incomplete at step {}", wizard.step()))?;

    let draft = rx.try_recv().context("Booking was not emitted")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&draft).context("Failed to serialize booking")?
    );
    Ok(())
}
