mod app;
mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use synchearts_core::AvailabilityStatus;
use synchearts_core::config::AppConfig;
use synchearts_core::session::Role;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::app::App;
use crate::commands::set::DayChanges;

#[derive(Parser)]
#[command(name = "synchearts")]
#[command(about = "Shared availability calendar for couples")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    /// I share my availability
    Share,
    /// I plan surprises (read-only)
    Plan,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Share => Role::Girlfriend,
            RoleArg::Plan => Role::Boyfriend,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start a session on this device
    Login {
        /// Shared secret; use the same key on both devices
        couple_key: String,

        #[arg(short, long, value_enum)]
        role: RoleArg,
    },
    /// End the session (your calendar stays saved)
    Logout,
    /// Show the upcoming days
    Days {
        /// Highlight surprise-friendly windows (planning mode)
        #[arg(short, long)]
        surprise: bool,
    },
    /// Change a day (sharing mode only)
    Set {
        /// "today", "+N" days from today, or YYYY-MM-DD
        day: String,

        #[arg(long)]
        morning: Option<AvailabilityStatus>,
        #[arg(long)]
        afternoon: Option<AvailabilityStatus>,
        #[arg(long)]
        evening: Option<AvailabilityStatus>,
        #[arg(long)]
        night: Option<AvailabilityStatus>,

        /// 0-100
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        mood: Option<u8>,
    },
    /// Keep showing the upcoming days, refreshing on remote changes
    Watch {
        /// Highlight surprise-friendly windows (planning mode)
        #[arg(short, long)]
        surprise: bool,
    },
    /// Manage the remote backend used for syncing
    Remote {
        #[command(subcommand)]
        action: RemoteAction,
    },
    /// Show paths and settings
    Config,
}

#[derive(Subcommand)]
enum RemoteAction {
    /// Show the configured remote
    Show,
    /// Sync through a PostgREST-compatible backend (e.g. Supabase)
    Set {
        #[arg(long)]
        url: String,

        /// API key sent with every request
        #[arg(long)]
        key: String,

        #[arg(long)]
        table: Option<String>,
    },
    /// Stop syncing; keep data on this device only
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    init_logging(&config);

    let app = App::new(config);

    match cli.command {
        Commands::Login { couple_key, role } => {
            commands::login::run(&app, &couple_key, role.into()).await
        }
        Commands::Logout => commands::logout::run(&app),
        Commands::Days { surprise } => commands::days::run(&app, surprise).await,
        Commands::Set {
            day,
            morning,
            afternoon,
            evening,
            night,
            mood,
        } => {
            let changes = DayChanges {
                morning,
                afternoon,
                evening,
                night,
                mood,
            };
            commands::set::run(&app, &day, changes).await
        }
        Commands::Watch { surprise } => commands::watch::run(&app, surprise).await,
        Commands::Remote { action } => match action {
            RemoteAction::Show => commands::remote::show(&app),
            RemoteAction::Set { url, key, table } => {
                commands::remote::set(&app, &url, &key, table.as_deref())
            }
            RemoteAction::Clear => commands::remote::clear(&app),
        },
        Commands::Config => commands::config::run(&app),
    }
}

/// Logs go to stderr; RUST_LOG wins over the configured level.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
