//! Error context and chaining utilities
//!
//! Lets callers wrap metadata or configuration failures with what they were
//! doing at the time, and later walk the resulting chain for logs.

use super::Error;
use std::fmt;

/// Trait for adding context to fallible results
///
/// Implemented for any result whose error converts into [`Error`], so IO and
/// TOML failures can be wrapped in one step.
pub trait ErrorContext<T> {
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Into<String>;

    /// Add context with lazy evaluation
    fn with_context<C, F>(self, f: F) -> Result<T, Error>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: Into<Error>,
{
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Into<String>,
    {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, Error>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}

/// Flattened view of an error and every context layer wrapped around it
pub struct ErrorChain<'a> {
    error: &'a Error,
    chain: Vec<String>,
}

impl<'a> ErrorChain<'a> {
    pub fn new(error: &'a Error) -> Self {
        let mut chain = Vec::new();
        let mut current = error;
        loop {
            chain.push(current.to_string());
            match current {
                Error::WithContext { source, .. } => current = source,
                _ => break,
            }
        }
        Self { error, chain }
    }

    /// Messages from the outermost context to the root cause
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    pub fn root_cause(&self) -> &Error {
        self.error.root_cause()
    }

    /// Single-line form for log records
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.error.error_code(), self.chain.join(" -> "))
    }

    /// Multi-line form with a numbered cause list
    pub fn format_for_display(&self) -> String {
        match self.chain.split_first() {
            Some((head, rest)) if !rest.is_empty() => {
                let causes = rest
                    .iter()
                    .enumerate()
                    .map(|(i, msg)| format!("  {}. {}", i + 1, msg))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("{}\n\nCaused by:\n{}", head, causes)
            }
            Some((head, _)) => head.clone(),
            None => String::new(),
        }
    }
}

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_for_display())
    }
}
