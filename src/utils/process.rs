use std::ffi::OsStr;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How a blocking external call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// The process exited (with any status); its stdout.
    Completed(String),
    TimedOut,
    Failed(String),
}

/// Runs `program` with `args`, feeds `input` to its stdin, and collects stdout
/// until it exits or `timeout` elapses. A timed-out process is killed.
pub fn run_with_timeout<S: AsRef<OsStr>>(
    program: &Path,
    args: &[S],
    input: Option<&str>,
    timeout: Duration,
) -> ProcessOutcome {
    let mut child = match Command::new(program)
        .args(args)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            return ProcessOutcome::Failed(format!(
                "Failed to run {}: {}",
                program.display(),
                e
            ));
        }
    };

    let deadline = Instant::now() + timeout;

    // Drain stdout on its own thread so a chatty process never blocks on a full pipe
    let (tx, rx) = mpsc::channel();
    if let Some(mut stdout) = child.stdout.take() {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = stdout.read_to_end(&mut buffer);
            let _ = tx.send(String::from_utf8_lossy(&buffer).into_owned());
        });
    }

    // Write on its own thread: a process that never reads must not stall the deadline
    if let (Some(mut stdin), Some(input)) = (child.stdin.take(), input) {
        let input = input.to_string();
        let name = program.display().to_string();
        thread::spawn(move || {
            if let Err(e) = stdin.write_all(input.as_bytes()) {
                log::debug!("Could not write to {}: {}", name, e);
            }
            // stdin is dropped here, closing the pipe
        });
    }

    loop {
        match child.try_wait() {
            Ok(Some(_)) => break,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return ProcessOutcome::TimedOut;
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                return ProcessOutcome::Failed(format!(
                    "Failed to wait for {}: {}",
                    program.display(),
                    e
                ));
            }
        }
    }

    // Grandchildren may still hold the pipe open; do not wait past the deadline
    let remaining = deadline
        .saturating_duration_since(Instant::now())
        .max(Duration::from_millis(100));
    match rx.recv_timeout(remaining) {
        Ok(output) => ProcessOutcome::Completed(output),
        Err(_) => ProcessOutcome::TimedOut,
    }
}

/// Resolves a program name the way a shell would: paths are taken as given,
/// bare names are looked up on `PATH`.
pub fn find_program(program: &str) -> Option<PathBuf> {
    let path = Path::new(program);
    if path.components().count() > 1 {
        return path.exists().then(|| path.to_path_buf());
    }

    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths)
            .flat_map(|dir| {
                let candidate = dir.join(program);
                let with_ext = candidate.with_extension(std::env::consts::EXE_EXTENSION);
                [candidate, with_ext]
            })
            .find(|candidate| candidate.is_file())
    })
}
