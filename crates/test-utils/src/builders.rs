use std::time::Duration;

use regex::Regex;
use runmon::config::RunConfig;

/// Builder for `RunConfig` to simplify test setup.
pub struct RunConfigBuilder {
    command: String,
    pattern: String,
    tasks: Vec<String>,
    startup_timeout: Option<Duration>,
}

impl RunConfigBuilder {
    pub fn new(command: &str, pattern: &str) -> Self {
        Self {
            command: command.to_string(),
            pattern: pattern.to_string(),
            tasks: Vec::new(),
            startup_timeout: None,
        }
    }

    pub fn task(mut self, command: &str) -> Self {
        self.tasks.push(command.to_string());
        self
    }

    pub fn startup_timeout_ms(mut self, millis: u64) -> Self {
        self.startup_timeout = Some(Duration::from_millis(millis));
        self
    }

    pub fn build(self) -> RunConfig {
        assert!(!self.tasks.is_empty(), "RunConfig needs at least one task");
        RunConfig {
            command: self.command,
            pattern: Regex::new(&self.pattern).expect("builder pattern must compile"),
            tasks: self.tasks,
            startup_timeout: self.startup_timeout,
        }
    }
}
