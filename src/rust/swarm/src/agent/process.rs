//! Child process handling for agent scripts.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::AgentError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Exited(i32),
    Signalled,
    TimedOut(Duration),
}

impl From<ExitStatus> for Outcome {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => Outcome::Exited(code),
            None => Outcome::Signalled,
        }
    }
}

fn command(program: &Path, args: &[&str], env: &[(String, String)]) -> Command {
    let mut command = Command::new(program);
    command
        .args(args)
        .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null());
    command
}

fn spawn_error(program: &Path) -> impl FnOnce(std::io::Error) -> AgentError + '_ {
    move |source| {
        log::error!("failed to run {}: {}", program.display(), source);
        AgentError::Spawn {
            program: program.display().to_string(),
            source,
        }
    }
}

/// Run with stdout captured and a hard deadline.
///
/// Stdout is drained on its own thread so a chatty child cannot stall on a
/// full pipe. On timeout the reader is left behind and nothing is returned
/// from it.
pub(crate) fn run_captured(
    program: &Path,
    args: &[&str],
    env: &[(String, String)],
    limit: Duration,
) -> Result<(Outcome, String), AgentError> {
    let mut child = command(program, args, env)
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(spawn_error(program))?;

    let reader = child.stdout.take().map(|mut stdout| {
        thread::spawn(move || {
            let mut captured = String::new();
            stdout.read_to_string(&mut captured).map(|_| captured)
        })
    });

    let outcome = wait_with_deadline(&mut child, limit).map_err(spawn_error(program))?;
    if let Outcome::TimedOut(_) = outcome {
        return Ok((outcome, String::new()));
    }

    let stdout = match reader.map(|handle| handle.join()) {
        Some(Ok(Ok(captured))) => captured,
        Some(Ok(Err(err))) => return Err(spawn_error(program)(err)),
        Some(Err(_)) => {
            log::warn!("stdout reader for {} panicked", program.display());
            String::new()
        }
        None => String::new(),
    };
    Ok((outcome, stdout))
}

/// Run with inherited stdout and stderr. With a timeout the child is killed
/// once it has run for that long.
pub(crate) fn run(
    program: &Path,
    args: &[&str],
    env: &[(String, String)],
    timeout: Option<Duration>,
) -> Result<Outcome, AgentError> {
    let mut child = command(program, args, env)
        .spawn()
        .map_err(spawn_error(program))?;

    let outcome = match timeout {
        None => child.wait().map(Outcome::from),
        Some(limit) => wait_with_deadline(&mut child, limit),
    };
    outcome.map_err(spawn_error(program))
}

fn wait_with_deadline(child: &mut Child, limit: Duration) -> std::io::Result<Outcome> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status.into());
        }
        let elapsed = started.elapsed();
        if elapsed >= limit {
            log::warn!("killing pid {} after {:?}", child.id(), elapsed);
            child.kill()?;
            child.wait()?;
            return Ok(Outcome::TimedOut(limit));
        }
        thread::sleep(POLL_INTERVAL.min(limit - elapsed));
    }
}
