//! Operator-facing terminal output.
//!
//! Colors are applied only when stdout supports them; piped output stays
//! plain so it can be grepped.

use std::fmt::Display;

use owo_colors::{OwoColorize, Stream};

/// Print the application header with name and version.
pub fn header() {
    println!(
        "{} {}",
        "dutchbook".if_supports_color(Stream::Stdout, |t| t.bold()),
        env!("CARGO_PKG_VERSION").if_supports_color(Stream::Stdout, |t| t.dimmed())
    );
}

/// Print a section header.
pub fn section(title: &str) {
    println!();
    println!("{}", title.if_supports_color(Stream::Stdout, |t| t.bold()));
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let label = format!("{label:<16}");
    println!(
        "  {} {}",
        label.if_supports_color(Stream::Stdout, |t| t.dimmed()),
        value
    );
}

/// Print a success line.
pub fn success(message: &str) {
    println!(
        "  {} {message}",
        "✓".if_supports_color(Stream::Stdout, |t| t.green())
    );
}

/// Print a warning line.
pub fn warning(message: &str) {
    println!(
        "  {} {message}",
        "⚠".if_supports_color(Stream::Stdout, |t| t.yellow())
    );
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    eprintln!(
        "  {} {message}",
        "×".if_supports_color(Stream::Stderr, |t| t.red())
    );
}

/// Print a muted note.
pub fn note(message: &str) {
    println!(
        "  {}",
        message.if_supports_color(Stream::Stdout, |t| t.dimmed())
    );
}

/// Format a value in cyan.
pub fn highlight(value: impl Display) -> String {
    let value = value.to_string();
    format!("{}", value.if_supports_color(Stream::Stdout, |t| t.cyan()))
}

/// Print multiple lines of content, each indented.
pub fn lines(content: &str) {
    for line in content.lines() {
        println!("  {line}");
    }
}
