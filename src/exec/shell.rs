// src/exec/shell.rs

use tokio::process::Command;

/// Build a command that runs `command_line` through `sh -c`.
pub fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command_line);
    cmd
}
