//! Confirmation seam for interactive installs

use uvm_core::Result;

/// Asks the user a yes/no question
///
/// Only the interactive install path consults a prompt; unattended paths
/// never do.
pub trait ConfirmationPrompt: Send + Sync {
    /// Ask `question`, returning `default` when the user just presses enter
    fn ask(&self, question: &str, default: bool) -> Result<bool>;
}

/// Prompt that always gives the same answer
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl ConfirmationPrompt for FixedAnswer {
    fn ask(&self, question: &str, _default: bool) -> Result<bool> {
        tracing::debug!("{} -> {}", question, if self.0 { "yes" } else { "no" });
        Ok(self.0)
    }
}
