//! Biashara CLI - SME transaction classifier and credit scorer
//!
//! Usage:
//!   biashara init                    Initialize database
//!   biashara import --file CSV       Import a statement (replaces stored rows)
//!   biashara score                   Show the stored credit report
//!   biashara assess --file CSV       One-off report without storing
//!   biashara serve --port 3000       Start web server

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use biashara_core::config::Settings;
use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real environment variables still apply
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let mut settings =
        Settings::load_from(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(db) = cli.db {
        settings.database.path = db;
    }

    match cli.command {
        Commands::Init => commands::cmd_init(&settings.database.path),
        Commands::Import { file, subject } => {
            let db = commands::open_db(&settings.database.path)?;
            let pipeline = commands::build_pipeline(&settings);
            commands::cmd_import(&db, &pipeline, &file, subject).await
        }
        Commands::Score { subject, json } => {
            let db = commands::open_db(&settings.database.path)?;
            let pipeline = commands::build_pipeline(&settings);
            commands::cmd_score(&db, &pipeline, subject, json)
        }
        Commands::Assess { file, json } => {
            let pipeline = commands::build_pipeline(&settings);
            commands::cmd_assess(&pipeline, &file, json).await
        }
        Commands::Classify { description } => {
            let pipeline = commands::build_pipeline(&settings);
            commands::cmd_classify(pipeline.classifier(), &description).await
        }
        Commands::Subjects { action } => {
            let db = commands::open_db(&settings.database.path)?;
            match action {
                None | Some(SubjectsAction::List) => commands::cmd_subjects(&db),
                Some(SubjectsAction::Add { name }) => commands::cmd_subjects_add(&db, &name),
            }
        }
        Commands::Serve {
            host,
            port,
            static_dir,
        } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            if let Some(dir) = static_dir {
                settings.server.static_dir = Some(dir);
            }
            commands::cmd_serve(settings).await
        }
    }
}
