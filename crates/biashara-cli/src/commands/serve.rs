//! Server command implementation

use anyhow::{Context, Result};
use biashara_core::config::Settings;

pub async fn cmd_serve(settings: Settings) -> Result<()> {
    println!("🚀 Starting BiasharaScore server...");
    println!("   Database: {}", settings.database.path.display());
    println!(
        "   Listening: http://{}:{}",
        settings.server.host, settings.server.port
    );
    if let Some(ref dir) = settings.server.static_dir {
        println!("   Static files: {}", dir.display());
    }
    println!(
        "   Classifier: {} ({})",
        settings.classifier.backend.as_str(),
        settings.classifier.model
    );
    if settings.server.allowed_origins.is_empty() {
        println!("   CORS: any origin");
    }

    biashara_server::serve(settings)
        .await
        .context("Server stopped with an error")
}
