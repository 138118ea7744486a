//! Supporting helpers: colored stderr prefixes.

use owo_colors::OwoColorize;

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Prefix for fatal/usage errors on stderr.
pub fn error_prefix() -> String {
    if colors_enabled() {
        "⟦error⟧".red().bold().to_string()
    } else {
        "⟦error⟧".to_string()
    }
}

/// Prefix for friendly notes on stderr.
pub fn note_prefix() -> String {
    if colors_enabled() {
        "⟦note⟧".yellow().to_string()
    } else {
        "⟦note⟧".to_string()
    }
}
