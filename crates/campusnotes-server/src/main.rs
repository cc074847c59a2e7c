//! CampusNotes server CLI

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use campusnotes_core::config::Config;
use campusnotes_core::storage::{Database, DatabaseConfig};

use campusnotes_server::state::AppState;

#[derive(Parser)]
#[command(name = "campusnotes")]
#[command(author, version, about = "Student note-sharing platform", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database path (defaults to the platform data dir)
    #[arg(long, global = true)]
    database: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Apply pending database migrations and exit
    Migrate,

    /// Create an admin account; password comes from CAMPUSNOTES_ADMIN_PASSWORD
    CreateAdmin { name: String, email: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("campusnotes=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let open_db = |database: Option<String>| async {
        let db_config = match database {
            Some(path) => DatabaseConfig::with_path(path),
            None => DatabaseConfig::default(),
        };
        Database::new(db_config).await
    };

    match cli.command {
        Commands::Serve { port } => {
            let db = open_db(cli.database).await?;
            let port = port.unwrap_or(config.server.port);
            let state = Arc::new(AppState::new(config, db)?);
            campusnotes_server::serve(state, port).await
        }

        Commands::Migrate => {
            let db = open_db(cli.database).await?;
            let status = db.migration_status().await?;
            info!(
                current = status.current_version,
                target = status.target_version,
                "Migration status"
            );
            println!("Database schema at version {}", status.current_version);
            Ok(())
        }

        Commands::CreateAdmin { name, email } => {
            let password = std::env::var("CAMPUSNOTES_ADMIN_PASSWORD")
                .context("CAMPUSNOTES_ADMIN_PASSWORD must be set")?;
            if password.len() < config.auth.min_password_len {
                bail!(
                    "Password must be at least {} characters",
                    config.auth.min_password_len
                );
            }

            let db = open_db(cli.database).await?;
            let state = AppState::new(config, db)?;
            let admin = state.auth_service().create_admin(&name, &email, &password).await?;

            println!("Admin account created: {} <{}>", admin.name, admin.email);
            Ok(())
        }
    }
}
