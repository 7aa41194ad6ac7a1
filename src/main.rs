use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use rusqlite::{Connection, OpenFlags};
use tracing::info;
use tracing_subscriber::EnvFilter;

use jotter::bootstrap::{BootstrapOutcome, ensure_admin};
use jotter::config::ServerConfig;
use jotter::migrate::migrate;
use jotter::server::{AppState, create_router};
use jotter::store::{SqliteStore, Store};

const ADMIN_PASSWORD_ENV: &str = "JOTTER_ADMIN_PASSWORD";

#[derive(Parser)]
#[command(name = "jotter")]
#[command(about = "A multi-user note server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the database and create the first admin account
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Name for the admin account
        #[arg(long, default_value = "admin")]
        username: String,

        /// Skip interactive prompts; requires JOTTER_ADMIN_PASSWORD
        #[arg(long)]
        non_interactive: bool,
    },

    /// Import accounts and notes from a legacy database
    Migrate {
        /// Path to the legacy SQLite database
        #[arg(long)]
        source: String,

        /// Path to the destination database
        #[arg(long, default_value = "./data/jotter.db")]
        dest: String,
    },
}

fn admin_password(non_interactive: bool) -> anyhow::Result<String> {
    if let Ok(password) = std::env::var(ADMIN_PASSWORD_ENV) {
        return Ok(password);
    }
    if non_interactive {
        bail!("{ADMIN_PASSWORD_ENV} must be set when running with --non-interactive");
    }
    let password = inquire::Password::new("Admin password:")
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()?;
    Ok(password)
}

fn run_init(data_dir: String, username: String, non_interactive: bool) -> anyhow::Result<()> {
    let data_path = PathBuf::from(data_dir);
    fs::create_dir_all(&data_path)?;

    let store = SqliteStore::new(data_path.join("jotter.db"))?;
    store.initialize()?;

    if store.has_admin_account()? {
        println!("Server already initialized, nothing to do.");
        return Ok(());
    }

    let password = admin_password(non_interactive)?;
    if password.len() < 8 {
        bail!("Admin password must be at least 8 characters");
    }

    match ensure_admin(&store, &username, &password)? {
        BootstrapOutcome::Created { username } => {
            println!();
            println!("========================================");
            println!("Created admin account '{username}'.");
            println!();
            println!("Log in with POST /api/v1/auth/login to get a session token.");
            println!("========================================");
            println!();
        }
        BootstrapOutcome::AdminExists => {
            println!("Server already initialized, nothing to do.");
        }
    }

    Ok(())
}

fn run_migrate(source: String, dest: String) -> anyhow::Result<()> {
    let source_path = PathBuf::from(source);
    if !source_path.exists() {
        bail!("Source database not found: {}", source_path.display());
    }

    let dest_path = PathBuf::from(dest);
    if let Some(parent) = dest_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    // The legacy database is only ever read; all writes go to the destination.
    let source_conn = Connection::open_with_flags(
        &source_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    let dest_store = SqliteStore::new(&dest_path)?;
    let mut dest_conn = dest_store.connection();

    let summary = migrate(&source_conn, &mut dest_conn)?;

    println!();
    println!("Migration complete:");
    println!(
        "  accounts: {} copied, {} skipped",
        summary.accounts_copied, summary.accounts_skipped
    );
    println!(
        "  notes:    {} copied, {} skipped",
        summary.notes_copied, summary.notes_skipped
    );
    if summary.malformed_timestamps > 0 {
        println!(
            "  {} timestamp(s) could not be parsed and were stored as null",
            summary.malformed_timestamps
        );
    }
    println!();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jotter=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                username,
                non_interactive,
            } => {
                run_init(data_dir, username, non_interactive)?;
            }
            AdminCommands::Migrate { source, dest } => {
                run_migrate(source, dest)?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: PathBuf::from(data_dir),
            };

            let db_path = config.db_path();
            if !db_path.exists() {
                bail!(
                    "Server not initialized. Run 'jotter admin init' first to create the database and admin account."
                );
            }

            let store = SqliteStore::new(&db_path)?;
            if !store.has_admin_account()? {
                bail!(
                    "Server not initialized. Run 'jotter admin init' first to create the database and admin account."
                );
            }

            let state = Arc::new(AppState::new(Arc::new(store)));
            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
