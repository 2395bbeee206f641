//! Terminal confirmation prompt

use console::Term;
use dialoguer::Confirm;
use std::io;
use uvm_core::{Error, Result};
use uvm_update::ConfirmationPrompt;

/// Asks on the terminal; answers with the default when there is none
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerPrompt;

impl ConfirmationPrompt for DialoguerPrompt {
    fn ask(&self, question: &str, default: bool) -> Result<bool> {
        if !Term::stderr().is_term() {
            tracing::debug!("No terminal, answering '{}' with {}", question, default);
            return Ok(default);
        }

        Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact()
            .map_err(|e| Error::Io(io::Error::other(e)))
    }
}
