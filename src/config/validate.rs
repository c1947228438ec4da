// src/config/validate.rs

use regex::Regex;

use crate::cli::CliArgs;
use crate::config::model::RunConfig;
use crate::errors::{Result, RunmonError};

impl TryFrom<CliArgs> for RunConfig {
    type Error = RunmonError;

    fn try_from(args: CliArgs) -> std::result::Result<Self, Self::Error> {
        let mut positional = args.positional.into_iter();

        let (Some(command), Some(pattern)) = (positional.next(), positional.next()) else {
            return Err(RunmonError::MissingArguments);
        };
        let tasks: Vec<String> = positional.collect();
        if tasks.is_empty() {
            return Err(RunmonError::MissingArguments);
        }

        let pattern = compile_pattern(&pattern)?;

        Ok(RunConfig {
            command,
            pattern,
            tasks,
            startup_timeout: args.startup_match_timeout,
        })
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| RunmonError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn from(args: &[&str]) -> Result<RunConfig> {
        RunConfig::from_args(std::iter::once("runmon").chain(args.iter().copied()))
    }

    #[test]
    fn builds_config_from_positionals() {
        let cfg = from(&["./server", "listening on \\d+", "curl localhost", "echo up"]).unwrap();

        assert_eq!(cfg.command, "./server");
        assert!(cfg.pattern.is_match("now listening on 8080"));
        assert_eq!(cfg.tasks, vec!["curl localhost", "echo up"]);
        assert_eq!(cfg.slot_count(), 2);
        assert_eq!(cfg.startup_timeout, None);
    }

    #[test]
    fn keeps_zero_timeout_armed() {
        let cfg = from(&["--startup-match-timeout=0", "cmd", "pat", "task"]).unwrap();
        assert_eq!(cfg.startup_timeout, Some(Duration::ZERO));
    }

    #[test]
    fn fewer_than_three_positionals_is_missing_arguments() {
        for args in [
            &[][..],
            &["cmd"][..],
            &["cmd", "pat"][..],
            &["--startup-match-timeout=1000"][..],
            &["--startup-match-timeout=1000", "cmd", "pat"][..],
        ] {
            let err = from(args).unwrap_err();
            assert!(
                matches!(err, RunmonError::MissingArguments),
                "{args:?} gave {err:?}"
            );
            assert!(err.to_string().starts_with("Missing arguments"));
        }
    }

    #[test]
    fn unknown_option_wins_over_missing_arguments() {
        let err = from(&["--startup-match-timeout"]).unwrap_err();
        assert!(err.to_string().starts_with("Unknown option"), "got {err}");
    }

    #[test]
    fn invalid_pattern_is_its_own_error() {
        let err = from(&["cmd", "([", "task"]).unwrap_err();
        assert!(matches!(err, RunmonError::InvalidPattern { .. }), "got {err:?}");
    }
}
