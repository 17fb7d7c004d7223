//! CLI command implementations
//!
//! Commands are organized by operation:
//! - `analyze` - Full pipeline run over one or more dataset files
//! - `classify` - Domain classification preview for a single file
//! - `extract` - Rule-based unit extraction preview for a text entry

pub mod analyze;
pub mod classify;
pub mod extract;

pub use analyze::*;
pub use classify::*;
pub use extract::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}
