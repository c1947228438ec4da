// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

/// Usage line shown with [`RunmonError::MissingArguments`].
pub const USAGE: &str =
    "runmon [--startup-match-timeout=<milliseconds>] <command> <pattern> <task> [<task> ...]";

#[derive(Error, Debug)]
pub enum RunmonError {
    #[error("Missing arguments. Usage: {USAGE}")]
    MissingArguments,

    /// Both unrecognised flags and a malformed `--startup-match-timeout`
    /// value land here.
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Invalid pattern '{pattern}': {}", summarize_regex_error(.source))]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to spawn {what}: {source}")]
    Spawn {
        what: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to signal process {pid}: {source}")]
    Signal {
        pid: u32,
        #[source]
        source: nix::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// `regex` syntax errors render over several lines (pattern, caret, message).
/// Diagnostics must stay on one line, so keep only the final message.
fn summarize_regex_error(err: &regex::Error) -> String {
    let text = err.to_string();
    text.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("invalid regular expression")
        .to_string()
}

pub type Result<T> = std::result::Result<T, RunmonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pattern_renders_on_one_line() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = RunmonError::InvalidPattern {
            pattern: "(".to_string(),
            source,
        };

        let msg = err.to_string();
        assert!(msg.starts_with("Invalid pattern '('"));
        assert_eq!(msg.lines().count(), 1, "got: {msg:?}");
    }
}
