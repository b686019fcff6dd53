//! Child process launching with injected variables.
//!
//! Variables are passed through the child's environment only; nothing is
//! written to disk.

use envshield_domain::environment::VariableMap;
use tokio::process::Command;
use tracing::{debug, warn};

/// Exit code reported when the child was terminated by a signal.
pub const SIGNAL_EXIT_CODE: i32 = 1;

/// Errors that can occur while running a child process.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// No program was given.
    #[error("No command specified")]
    EmptyCommand,

    /// The program could not be started.
    #[error("Failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Waiting for the program failed.
    #[error("Failed to wait for {program}: {source}")]
    Wait {
        /// Program that was running.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Runs `command` with `variables` layered over the current environment.
///
/// Standard streams are inherited. Returns the child's exit code, or
/// [`SIGNAL_EXIT_CODE`] if it was killed by a signal.
///
/// # Errors
/// Returns an error if `command` is empty or the program cannot be started.
pub async fn run_with_variables(
    command: &[String],
    variables: &VariableMap,
) -> Result<i32, ProcessError> {
    let (program, args) = command.split_first().ok_or(ProcessError::EmptyCommand)?;

    debug!(
        program = %program,
        args = args.len(),
        variables = variables.len(),
        "Spawning child process"
    );

    let mut child = Command::new(program)
        .args(args)
        .envs(variables)
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;

    let status = child.wait().await.map_err(|source| ProcessError::Wait {
        program: program.clone(),
        source,
    })?;

    Ok(status.code().unwrap_or_else(|| {
        warn!(program = %program, "Child process terminated by signal");
        SIGNAL_EXIT_CODE
    }))
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_variables_are_injected() {
        let mut vars = VariableMap::new();
        vars.insert("ENVSHIELD_TEST_VALUE".to_string(), "injected".to_string());

        let code = run_with_variables(&sh(r#"test "$ENVSHIELD_TEST_VALUE" = injected"#), &vars)
            .await
            .expect("should run");
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_exit_code_is_propagated() {
        let code = run_with_variables(&sh("exit 7"), &VariableMap::new())
            .await
            .expect("should run");
        assert_eq!(code, 7);
    }

    #[tokio::test]
    async fn test_empty_command() {
        let result = run_with_variables(&[], &VariableMap::new()).await;
        assert!(matches!(result, Err(ProcessError::EmptyCommand)));
    }

    #[tokio::test]
    async fn test_unknown_program() {
        let command = vec!["envshield-definitely-not-a-program".to_string()];
        let result = run_with_variables(&command, &VariableMap::new()).await;
        assert!(matches!(result, Err(ProcessError::Spawn { .. })));
    }
}
