use crate::utils::error::{ProvisionError, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Spawn `command` with piped output and stream both stdout and stderr
/// line-by-line into tracing as they arrive. Blocks until the process exits;
/// a non-zero status becomes `CommandFailed`.
pub async fn run_streaming(mut command: Command, label: &str) -> Result<()> {
    command.stdout(std::process::Stdio::piped());
    command.stderr(std::process::Stdio::piped());

    tracing::debug!("Spawning `{}`", label);
    let mut child = command.spawn()?;

    let stdout = child.stdout.take().ok_or_else(|| ProvisionError::CommandFailed {
        command: label.to_string(),
        status: -1,
    })?;
    let stderr = child.stderr.take().ok_or_else(|| ProvisionError::CommandFailed {
        command: label.to_string(),
        status: -1,
    })?;

    let mut stdout_lines = BufReader::new(stdout).lines();
    let mut stderr_lines = BufReader::new(stderr).lines();

    let mut stdout_closed = false;
    let mut stderr_closed = false;

    while !(stdout_closed && stderr_closed) {
        tokio::select! {
            line = stdout_lines.next_line(), if !stdout_closed => {
                match line? {
                    Some(line) => tracing::debug!("[{}] {}", label, line),
                    None => stdout_closed = true,
                }
            }
            line = stderr_lines.next_line(), if !stderr_closed => {
                match line? {
                    Some(line) => tracing::debug!("[{}] {}", label, line),
                    None => stderr_closed = true,
                }
            }
        }
    }

    let status = child.wait().await?;
    if status.success() {
        Ok(())
    } else {
        Err(ProvisionError::CommandFailed {
            command: label.to_string(),
            status: status.code().unwrap_or(-1),
        })
    }
}
