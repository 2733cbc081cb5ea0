//! Child process execution.
//!
//! # Responsibilities
//! - Run a program to completion and capture its output
//! - Turn a non-zero exit into a `CharmError::Command`

use std::process::Stdio;

use tokio::process::Command;

use crate::error::{CharmError, Result};

/// Render a command line for logs and errors.
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a program and return its stdout, failing on a non-zero exit status.
pub async fn check_output(program: &str, args: &[String]) -> Result<String> {
    let command = display_command(program, args);
    tracing::debug!(command = %command, "Running command");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .env("DEBIAN_FRONTEND", "noninteractive")
        .output()
        .await
        .map_err(|source| CharmError::Spawn {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(CharmError::Command {
            command,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run a program for its side effects.
pub async fn check_call(program: &str, args: &[String]) -> Result<()> {
    check_output(program, args).await.map(|_| ())
}

/// Owned argument list from string slices.
pub fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_output_captures_stdout() {
        let out = check_output("echo", &args(&["hello"])).await.unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_error() {
        let err = check_call("false", &[]).await.unwrap_err();
        assert!(matches!(err, CharmError::Command { .. }));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let err = check_call("/nonexistent/heat-charm-tool", &[]).await.unwrap_err();
        assert!(matches!(err, CharmError::Spawn { .. }));
    }
}
