// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! The accepted surface is deliberately tiny: one optional
//! `--startup-match-timeout=<milliseconds>` flag plus positional arguments.
//! Clap's own error reporting is not shown to the user; [`try_parse_from`]
//! folds every clap failure into [`RunmonError::UnknownOption`] so the
//! diagnostics stay in the two categories `runmon` documents.

use std::ffi::OsString;
use std::time::Duration;

use clap::Parser;

use crate::errors::{Result, RunmonError};

/// Long name of the only recognised flag.
pub const STARTUP_MATCH_TIMEOUT_FLAG: &str = "--startup-match-timeout";

/// Command-line arguments for `runmon`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "runmon",
    about = "Run a command and start dependent tasks once its output matches a pattern.",
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
pub struct CliArgs {
    /// Start the tasks after this many milliseconds even if nothing matched.
    #[arg(
        long,
        value_name = "MILLISECONDS",
        require_equals = true,
        value_parser = parse_millis
    )]
    pub startup_match_timeout: Option<Duration>,

    /// `<command> <pattern> <task> [<task> ...]`
    #[arg(value_name = "ARGS")]
    pub positional: Vec<String>,
}

/// Parse `argv` (including the program name) into [`CliArgs`].
///
/// Every token starting with `-` must be a valid
/// `--startup-match-timeout=<milliseconds>`; this holds for `-` and `--` too.
pub fn try_parse_from<I, T>(argv: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();

    if let Some(token) = first_rejected_option(argv.iter().skip(1)) {
        return Err(RunmonError::UnknownOption(token));
    }

    CliArgs::try_parse_from(&argv).map_err(|err| {
        let reason = err
            .to_string()
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches("error: ")
            .to_string();
        RunmonError::UnknownOption(reason)
    })
}

/// Parse a millisecond count.
///
/// Only plain ASCII digits are accepted, so `+5`, `-1`, ` 5` and the empty
/// string are all rejected.
pub fn parse_millis(s: &str) -> std::result::Result<Duration, String> {
    if s.is_empty() {
        return Err("missing millisecond value".to_string());
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{s}' is not a non-negative integer"));
    }

    let millis: u64 = s
        .parse()
        .map_err(|e| format!("invalid millisecond value '{s}': {e}"))?;
    Ok(Duration::from_millis(millis))
}

/// Locate the first option-like token that is not a valid timeout flag.
fn first_rejected_option<'a>(mut args: impl Iterator<Item = &'a OsString>) -> Option<String> {
    args.find_map(|arg| {
        let arg = arg.to_string_lossy();
        (arg.starts_with('-') && !is_valid_timeout_flag(&arg)).then(|| arg.into_owned())
    })
}

fn is_valid_timeout_flag(arg: &str) -> bool {
    arg.strip_prefix(STARTUP_MATCH_TIMEOUT_FLAG)
        .and_then(|rest| rest.strip_prefix('='))
        .is_some_and(|value| parse_millis(value).is_ok())
}
