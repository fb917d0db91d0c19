//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use biashara_core::models::DEFAULT_SUBJECT_ID;

/// Biashara - Credit scoring from small-business statements
#[derive(Parser)]
#[command(name = "biashara")]
#[command(about = "Classify SME transactions and score creditworthiness", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (overrides config and BIASHARA_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings override file (defaults to BIASHARA_CONFIG or the data dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import a statement, replacing the subject's stored transactions
    Import {
        /// CSV statement to import
        #[arg(short, long)]
        file: PathBuf,

        /// Subject (business) id
        #[arg(short, long, default_value_t = DEFAULT_SUBJECT_ID)]
        subject: i64,
    },

    /// Show the credit report for stored transactions
    Score {
        /// Subject (business) id
        #[arg(short, long, default_value_t = DEFAULT_SUBJECT_ID)]
        subject: i64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Assess a statement in memory without storing it
    Assess {
        /// CSV statement to assess
        #[arg(short, long)]
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a single transaction description
    Classify {
        /// Transaction description
        description: String,
    },

    /// Manage subjects (businesses being scored); lists them by default
    Subjects {
        #[command(subcommand)]
        action: Option<SubjectsAction>,
    },

    /// Start the web server
    Serve {
        /// Host to bind to (defaults to config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory of static dashboard files
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum SubjectsAction {
    /// List subjects with their transaction counts
    List,

    /// Add a subject and print its id
    Add {
        /// Business name
        name: String,
    },
}
