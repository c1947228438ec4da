// src/config/model.rs

use std::ffi::OsString;
use std::time::Duration;

use regex::Regex;

use crate::cli;
use crate::errors::Result;

/// Everything a single `runmon` invocation needs, built once from argv.
///
/// A `RunConfig` always has a command, a compiled pattern and at least one
/// dependent task; anything less fails in [`RunConfig::from_args`].
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Shell command line for the master task.
    pub command: String,
    /// Searched for in every line the master writes to stdout.
    pub pattern: Regex,
    /// Dependent task command lines. The index is the task's slot.
    pub tasks: Vec<String>,
    /// Start the tasks after this long even if the pattern never matched.
    pub startup_timeout: Option<Duration>,
}

impl RunConfig {
    /// Parse `argv` (program name first, as from `std::env::args_os()`).
    pub fn from_args<I, T>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = cli::try_parse_from(argv)?;
        RunConfig::try_from(args)
    }

    /// Number of dependent task slots.
    pub fn slot_count(&self) -> usize {
        self.tasks.len()
    }
}
