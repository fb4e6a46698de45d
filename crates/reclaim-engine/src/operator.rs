//! Operator console: steer a running simulation from standard input.
//!
//! One command per line:
//!
//! | Command | Effect |
//! |---------|--------|
//! | `pause` | Hold the loop before the next tick |
//! | `resume` | Continue a paused run |
//! | `speed <ms>` | Change the pause between ticks |
//! | `status` | Log state, pacing, and elapsed time |
//! | `stop` | End the run cleanly after the current tick |
//!
//! Lines are read on a dedicated thread and handed to the async side over
//! a channel, so a pending read never holds up shutdown.

use std::io::BufRead;
use std::sync::Arc;

use reclaim_core::control::RunControl;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::CommandError;

/// Lines buffered between the reader thread and [`drive`].
const LINE_BUFFER: usize = 16;

/// A parsed console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Pause before the next tick.
    Pause,
    /// Resume a paused run.
    Resume,
    /// Set the pause between ticks, in milliseconds.
    Speed(u64),
    /// Log the current run state.
    Status,
    /// Request a clean stop.
    Stop,
}

/// Parse one console line. Case-insensitive; surrounding whitespace is
/// ignored.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default().to_ascii_lowercase();
    match verb.as_str() {
        "pause" | "p" => Ok(Command::Pause),
        "resume" | "r" => Ok(Command::Resume),
        "status" | "s" => Ok(Command::Status),
        "stop" | "quit" | "q" => Ok(Command::Stop),
        "speed" => {
            let value = words.next().ok_or(CommandError::MissingInterval)?;
            value
                .parse()
                .map(Command::Speed)
                .map_err(|source| CommandError::InvalidInterval {
                    value: value.to_owned(),
                    source,
                })
        }
        _ => Err(CommandError::Unknown(line.trim().to_owned())),
    }
}

/// Apply `command` to the run. Returns whether it changed anything.
pub fn apply(command: Command, control: &RunControl) -> bool {
    match command {
        Command::Pause => {
            let paused = control.pause();
            if paused {
                info!("Operator paused the simulation");
            } else {
                warn!(state = ?control.state(), "Pause ignored: simulation is not running");
            }
            paused
        }
        Command::Resume => {
            let resumed = control.resume();
            if resumed {
                info!("Operator resumed the simulation");
            } else {
                warn!(state = ?control.state(), "Resume ignored: simulation is not paused");
            }
            resumed
        }
        Command::Speed(ms) => {
            let previous = control.set_tick_interval_ms(ms);
            info!(previous_ms = previous, tick_interval_ms = ms, "Tick interval changed");
            previous != ms
        }
        Command::Status => {
            info!(
                state = ?control.state(),
                tick_interval_ms = control.tick_interval_ms(),
                elapsed_seconds = control.elapsed_seconds(),
                max_ticks = control.max_ticks(),
                "Run status"
            );
            false
        }
        Command::Stop => {
            let first = !control.is_stop_requested();
            info!("Operator requested stop");
            control.request_stop();
            first
        }
    }
}

/// Start the thread that reads standard input line by line.
///
/// The returned receiver closes at end of input or when the thread cannot
/// be started.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(LINE_BUFFER);
    let spawned = std::thread::Builder::new()
        .name("operator-console".to_owned())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Operator console read failed");
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "Operator console unavailable");
    }
    rx
}

/// Apply console lines to `control` until input ends or a stop is
/// requested.
pub async fn drive(mut lines: mpsc::Receiver<String>, control: Arc<RunControl>) {
    while let Some(line) = lines.recv().await {
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(command) => {
                apply(command, &control);
            }
            Err(e) => warn!(error = %e, "Ignoring console input"),
        }
        if control.is_stop_requested() {
            break;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reclaim_core::config::SimulationBounds;
    use reclaim_core::control::RunState;

    use super::*;

    fn control() -> Arc<RunControl> {
        Arc::new(RunControl::new(&SimulationBounds {
            max_ticks: 0,
            max_real_time_seconds: 0,
            tick_interval_ms: 0,
        }))
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("pause").unwrap(), Command::Pause);
        assert_eq!(parse_command("  RESUME ").unwrap(), Command::Resume);
        assert_eq!(parse_command("speed 250").unwrap(), Command::Speed(250));
        assert_eq!(parse_command("s").unwrap(), Command::Status);
        assert_eq!(parse_command("quit").unwrap(), Command::Stop);
    }

    #[test]
    fn rejects_bad_commands() {
        assert!(matches!(parse_command("jump"), Err(CommandError::Unknown(w)) if w == "jump"));
        assert!(matches!(parse_command("speed"), Err(CommandError::MissingInterval)));
        assert!(matches!(
            parse_command("speed fast"),
            Err(CommandError::InvalidInterval { .. })
        ));
        assert!(matches!(parse_command("speed -5"), Err(CommandError::InvalidInterval { .. })));
    }

    #[test]
    fn pause_and_resume_toggle_the_run() {
        let control = control();
        assert!(apply(Command::Pause, &control));
        assert_eq!(control.state(), RunState::Paused);
        assert!(!apply(Command::Pause, &control));
        assert!(apply(Command::Resume, &control));
        assert_eq!(control.state(), RunState::Running);
        assert!(!apply(Command::Resume, &control));
    }

    #[test]
    fn speed_changes_the_interval() {
        let control = control();
        assert!(apply(Command::Speed(200), &control));
        assert_eq!(control.tick_interval_ms(), 200);
        assert!(!apply(Command::Speed(200), &control));
        assert!(!apply(Command::Status, &control));
    }

    #[tokio::test]
    async fn drive_applies_lines_until_stop() {
        let control = control();
        let (tx, rx) = mpsc::channel(8);
        for line in ["pause", "", "bogus", "speed 50", "stop", "resume"] {
            tx.send(line.to_owned()).await.unwrap();
        }

        drive(rx, Arc::clone(&control)).await;

        assert_eq!(control.state(), RunState::Stopping);
        assert_eq!(control.tick_interval_ms(), 50);
    }

    #[tokio::test]
    async fn drive_ends_with_input() {
        let control = control();
        let (tx, rx) = mpsc::channel(8);
        tx.send("pause".to_owned()).await.unwrap();
        drop(tx);

        drive(rx, Arc::clone(&control)).await;
        assert_eq!(control.state(), RunState::Paused);
    }
}
