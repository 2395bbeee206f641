//! Terminal output utilities

use console::{style, Term};
use uvm_update::{OutputSink, StatusEvent, StatusLevel};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Print a verbose step
pub fn detail(msg: &str) {
    println!("  {}", style(msg).dim());
}

/// Print a header
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Renders pipeline status events on the terminal
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    quiet: bool,
    interactive: bool,
}

impl ConsoleSink {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            interactive: Term::stderr().is_term(),
        }
    }
}

impl OutputSink for ConsoleSink {
    fn emit(&self, event: &StatusEvent) {
        if !event.visible {
            return;
        }
        match event.level {
            StatusLevel::Detail if !self.quiet => detail(&event.message),
            StatusLevel::Info if !self.quiet => info(&event.message),
            StatusLevel::Detail | StatusLevel::Info => {}
            StatusLevel::Success => success(&event.message),
            StatusLevel::Warn => warning(&event.message),
            StatusLevel::Error => error(&event.message),
        }
    }

    fn is_interactive(&self) -> bool {
        self.interactive && !self.quiet
    }
}
