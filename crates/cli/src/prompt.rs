//! Terminal confirmation prompt.

use std::io::{self, BufRead, Write};

use b2b_cart_store::Confirm;

/// Asks on stderr and reads the answer from stdin. Anything other than
/// `y`/`yes` (including a read error or EOF) declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, message: &str) -> bool {
        ask(message, &mut io::stdin().lock(), &mut io::stderr().lock())
    }
}

fn ask(message: &str, input: &mut impl BufRead, prompt: &mut impl Write) -> bool {
    if write!(prompt, "{message} [y/N] ")
        .and_then(|()| prompt.flush())
        .is_err()
    {
        return false;
    }

    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => is_yes(&answer),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read confirmation");
            false
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
