//! Confirmation capability for destructive cart changes.
//!
//! The store never prompts on its own. Callers pass something that can answer
//! a yes/no question: a UI dialog, a terminal prompt, or a fixed answer in
//! tests.

/// Prompt shown before another seller's items are discarded.
pub const SWITCH_SELLER_PROMPT: &str =
    "Starting a new cart will clear items from other sellers. Continue?";

/// Answers a yes/no question.
pub trait Confirm {
    /// Return `true` to proceed.
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Always proceeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

/// Always declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

impl Confirm for NeverConfirm {
    fn confirm(&self, _message: &str) -> bool {
        false
    }
}
