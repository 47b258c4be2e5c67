//! Path utilities for dutchbook.
//!
//! Default data lives under `~/.dutchbook/`:
//! - `~/.dutchbook/relations.json` - declared relationships

use std::path::PathBuf;

/// Returns the dutchbook home directory (`~/.dutchbook/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dutchbook")
}

/// Returns the default relationship document path (`~/.dutchbook/relations.json`).
pub fn default_relations() -> PathBuf {
    home_dir().join("relations.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_under_dutchbook_home() {
        assert!(home_dir().to_string_lossy().contains(".dutchbook"));
        assert!(default_relations().ends_with(".dutchbook/relations.json"));
    }
}
