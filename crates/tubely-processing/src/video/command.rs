use std::ffi::OsString;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

use crate::traits::ToolError;

/// Longest stderr excerpt carried in errors and logs
const STDERR_EXCERPT_LEN: usize = 2048;

/// Run an external tool to completion under a deadline.
///
/// The child is spawned with `kill_on_drop`, so hitting the deadline or
/// dropping the calling future terminates it.
pub(crate) async fn run_tool(
    program: &str,
    args: &[OsString],
    timeout: Duration,
) -> Result<Output, ToolError> {
    let start = std::time::Instant::now();

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(timeout, child).await {
        Ok(Ok(output)) => output,
        Ok(Err(source)) => {
            tracing::error!(tool = %program, error = %source, "Failed to spawn media tool");
            return Err(ToolError::Spawn {
                tool: program.to_string(),
                source,
            });
        }
        Err(_) => {
            tracing::error!(
                tool = %program,
                args = ?args,
                timeout_secs = timeout.as_secs(),
                "Media tool timed out and was killed"
            );
            return Err(ToolError::Timeout {
                tool: program.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }
    };

    if !output.status.success() {
        let stderr = stderr_excerpt(&output.stderr);
        tracing::error!(
            tool = %program,
            args = ?args,
            exit_status = %output.status,
            stderr = %stderr,
            "Media tool exited with failure"
        );
        return Err(ToolError::NonZeroExit {
            tool: program.to_string(),
            status: output.status.to_string(),
            stderr,
        });
    }

    tracing::debug!(
        tool = %program,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Media tool finished"
    );

    Ok(output)
}

fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.len() <= STDERR_EXCERPT_LEN {
        return text.to_string();
    }
    let mut cut = text.len() - STDERR_EXCERPT_LEN;
    while !text.is_char_boundary(cut) {
        cut += 1;
    }
    format!("...{}", &text[cut..])
}
