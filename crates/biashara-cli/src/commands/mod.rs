//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and classify commands plus shared utilities (open_db, build_pipeline)
//! - `import` - Statement import and in-memory assessment
//! - `score` - Stored credit report and report formatting
//! - `serve` - Web server command
//! - `subjects` - Subject listing and creation

pub mod core;
pub mod import;
pub mod score;
pub mod serve;
pub mod subjects;

// Re-export command functions for main.rs
pub use core::*;
pub use import::*;
pub use score::*;
pub use serve::*;
pub use subjects::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
