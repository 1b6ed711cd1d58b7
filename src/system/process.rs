//! External commands run during assembly.
//!
//! Installers and install scripts are invoked through [`CommandRunner`] so the
//! assembler never spawns processes directly. Calls block until the child
//! exits; there is no timeout.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to spawn '{command}' in '{}': {source}", cwd.display())]
    Spawn {
        command: String,
        cwd: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' in '{}' exited with {}", cwd.display(), describe_exit(*code))]
    Failed {
        command: String,
        cwd: PathBuf,
        code: Option<i32>,
    },
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Runs one shell command line in a working directory.
pub trait CommandRunner {
    fn run(&self, command: &str, cwd: &Path) -> Result<(), ProcessError>;
}

/// Runs commands through `sh -c`, inheriting stdout/stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str, cwd: &Path) -> Result<(), ProcessError> {
        info!(command, cwd = %cwd.display(), "executing");
        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(cwd)
            .status()
            .map_err(|source| ProcessError::Spawn {
                command: command.to_string(),
                cwd: cwd.to_path_buf(),
                source,
            })?;

        if status.success() {
            return Ok(());
        }
        Err(ProcessError::Failed {
            command: command.to_string(),
            cwd: cwd.to_path_buf(),
            code: status.code(),
        })
    }
}

/// Run `command` in `cwd` and capture its stdout.
pub fn output(command: &str, cwd: &Path) -> Result<String, ProcessError> {
    let out = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .output()
        .map_err(|source| ProcessError::Spawn {
            command: command.to_string(),
            cwd: cwd.to_path_buf(),
            source,
        })?;

    if !out.status.success() {
        return Err(ProcessError::Failed {
            command: command.to_string(),
            cwd: cwd.to_path_buf(),
            code: out.status.code(),
        });
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn runs_in_the_requested_directory() {
        let tmp = TempDir::new().unwrap();
        ShellRunner.run("touch marker", tmp.path()).unwrap();
        assert!(tmp.path().join("marker").is_file());
    }

    #[test]
    fn non_zero_exit_is_an_error_with_the_code() {
        let tmp = TempDir::new().unwrap();
        let err = ShellRunner.run("exit 3", tmp.path()).unwrap_err();
        assert!(matches!(err, ProcessError::Failed { code: Some(3), .. }));
        assert!(err.to_string().contains("'exit 3'"));
        assert!(err.to_string().ends_with("exited with status 3"));
    }

    #[test]
    fn output_captures_stdout() {
        let tmp = TempDir::new().unwrap();
        let out = output("printf 'version=2.1'", tmp.path()).unwrap();
        assert_eq!(out, "version=2.1");
    }
}
