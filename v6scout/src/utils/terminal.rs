//! # Terminal Input Helper
//!
//! Repeatedly prompts until the answer satisfies every [`Sanitize`] filter.
//! Rejections print the filter's message and ask again.
//!
//! ## Example
//! ```rust,no_run
//! use v6scout::utils::{Sanitize, Terminal};
//!
//! if let Some(input) = Terminal::ask("Address to canonicalize:", &[Sanitize::IsIpv6]) {
//!     println!("{}", v6scout::canonicalize_ipv6(&input.answer));
//! }
//! ```
use std::io::{self, BufRead, Write};

use crate::utils::sanitize::Sanitize;

/// An accepted, trimmed answer.
pub struct Terminal {
    pub answer: String,
}

impl Terminal {
    /// Prompts on stdout and reads stdin until a valid answer arrives.
    ///
    /// Returns `None` once stdin is closed.
    pub fn ask(question: &str, filters: &[Sanitize]) -> Option<Terminal> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        Self::ask_with(&mut stdin.lock(), &mut stdout.lock(), question, filters)
    }

    /// Same loop as [`Terminal::ask`] over any reader/writer pair.
    pub fn ask_with<R: BufRead, W: Write>(
        input: &mut R,
        output: &mut W,
        question: &str,
        filters: &[Sanitize],
    ) -> Option<Terminal> {
        loop {
            writeln!(output, "{}", question).ok()?;
            output.flush().ok()?;

            let mut answer = String::new();
            match input.read_line(&mut answer) {
                Ok(0) => return None,
                Ok(_) => match Sanitize::execute(&answer, filters) {
                    Ok(answer) => return Some(Terminal { answer }),
                    Err(e) => {
                        writeln!(output, "{}", e).ok()?;
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "couldn't read line");
                    return None;
                }
            }
        }
    }
}
