#![allow(dead_code)]

use std::process::{Command, Output};

pub use runmon_test_utils::init_tracing;

/// Path of the `runmon` binary built for this test run.
pub fn runmon_bin() -> &'static str {
    env!("CARGO_BIN_EXE_runmon")
}

/// Run `runmon` to completion with the given arguments.
///
/// `RUNMON_LOG` is cleared so stderr only carries what runmon emits at the
/// default level.
pub fn runmon(args: &[&str]) -> Output {
    Command::new(runmon_bin())
        .args(args)
        .env_remove("RUNMON_LOG")
        .output()
        .expect("failed to run runmon binary")
}

pub fn stdout_of(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

pub fn stderr_of(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

/// How many lines of `text` are exactly `line`.
pub fn count_lines(text: &str, line: &str) -> usize {
    text.lines().filter(|l| *l == line).count()
}
