//! Helpers for running external tools (git, helm, diff viewers).

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Runs `program` with `args` in `dir` and captures its output.
pub fn run_in(dir: &Path, program: &str, args: &[&str]) -> std::io::Result<Output> {
    Command::new(program).current_dir(dir).args(args).output()
}

/// Runs `program` without arguments, feeding `input` on stdin.
///
/// Returns the exit status together with stdout followed by stderr.
pub fn pipe_through(program: &str, input: &[u8]) -> std::io::Result<(bool, String)> {
    let mut child = Command::new(program)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    // Feed stdin from its own thread so a chatty viewer cannot fill the
    // stdout pipe while we are still writing.
    let stdin = child.stdin.take();
    let input = input.to_vec();
    let writer = std::thread::spawn(move || -> std::io::Result<()> {
        if let Some(mut stdin) = stdin {
            match stdin.write_all(&input) {
                // A viewer may exit before reading everything
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e),
                _ => {}
            }
        }
        Ok(())
    });

    let output = child.wait_with_output()?;
    writer
        .join()
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "stdin writer panicked"))??;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    Ok((output.status.success(), combined))
}

/// Formats a failed command with both stdout and stderr for better debugging.
pub fn format_output_error(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

    match (stderr.is_empty(), stdout.is_empty()) {
        (true, true) => format!(
            "Command failed with exit code {}",
            output.status.code().unwrap_or(-1)
        ),
        (true, false) => stdout,
        (false, true) => stderr,
        (false, false) => format!("{}\n{}", stderr, stdout),
    }
}
