//! Privilege-escalation ("become") handlers.
//!
//! The transport only asks one question of a handler: will the escalated
//! command stop and wait for a password prompt? If so, and pipelining is
//! off, the child's stdin is attached to a pty.

use std::fmt;

/// A privilege-escalation method.
pub trait Become: Send + Sync + fmt::Debug {
    /// Method name, for logging.
    fn name(&self) -> &str;

    /// Whether the escalated command expects an interactive prompt.
    fn expects_prompt(&self) -> bool;
}

/// Escalation that never prompts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoEscalation;

impl Become for NoEscalation {
    fn name(&self) -> &str {
        "none"
    }

    fn expects_prompt(&self) -> bool {
        false
    }
}

/// Escalation that answers a password prompt (e.g. `runas`, `sudo -S`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBased {
    method: String,
    prompt: String,
}

impl PromptBased {
    /// Create a handler for `method` that waits for `prompt`.
    pub fn new(method: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            prompt: prompt.into(),
        }
    }
}

impl Become for PromptBased {
    fn name(&self) -> &str {
        &self.method
    }

    fn expects_prompt(&self) -> bool {
        !self.prompt.is_empty()
    }
}
