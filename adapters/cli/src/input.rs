//! Producer threads feeding the viewer loop.
//!
//! The status poller and the console reader run on their own threads and
//! send [`LoopInput`] values over one channel, so the loop applies commands
//! strictly in arrival order.

use std::{
    fs,
    io::{self, BufRead},
    path::{Path, PathBuf},
    sync::mpsc::Sender,
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use conga_map_core::{CanvasExtent, Command, RotationDirection, StatusPayload};
use conga_map_rendering::validate_canvas;
use conga_map_system_ingest::parse_status;
use tracing::{debug, info, warn};

/// Message consumed by the viewer loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum LoopInput {
    /// Command forwarded to the viewer.
    Command(Command),
    /// Stops the loop.
    Quit,
}

/// Reads and parses the status document at `path`.
pub(crate) fn read_status(path: &Path) -> Result<StatusPayload> {
    let document = fs::read_to_string(path)
        .with_context(|| format!("failed to read status document at {}", path.display()))?;
    parse_status(&document)
        .with_context(|| format!("malformed status document at {}", path.display()))
}

/// Spawns the thread that re-reads the status document every `interval`.
///
/// The thread exits once the receiving side of `sender` is gone.
pub(crate) fn spawn_status_poller(
    path: PathBuf,
    interval: Duration,
    sender: Sender<LoopInput>,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("status-poller".into())
        .spawn(move || loop {
            match read_status(&path) {
                Ok(payload) => {
                    if sender
                        .send(LoopInput::Command(Command::Ingest { payload }))
                        .is_err()
                    {
                        debug!("viewer loop closed; stopping status poller");
                        return;
                    }
                }
                Err(error) => warn!("{error:#}"),
            }
            thread::sleep(interval);
        })
        .context("failed to spawn status poller thread")
}

/// Spawns the thread that turns console lines into loop input.
///
/// End of input stops the reader without stopping the loop.
pub(crate) fn spawn_console_reader(sender: Sender<LoopInput>) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("console-reader".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(error) => {
                        warn!(%error, "failed to read console input");
                        return;
                    }
                };
                match parse_console_line(&line) {
                    Ok(Some(input)) => {
                        if sender.send(input).is_err() {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(error) => warn!("{error:#}"),
                }
            }
            info!("console input closed");
        })
        .context("failed to spawn console reader thread")
}

/// Parses one console line.
///
/// Blank lines yield `None`.
pub(crate) fn parse_console_line(line: &str) -> Result<Option<LoopInput>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let input = match verb.to_ascii_lowercase().as_str() {
        "cw" => rotate(RotationDirection::Clockwise),
        "ccw" => rotate(RotationDirection::CounterClockwise),
        "resize" => {
            let width = parse_dimension(words.next(), "width")?;
            let height = parse_dimension(words.next(), "height")?;
            let canvas = validate_canvas(CanvasExtent::new(width, height))?;
            LoopInput::Command(Command::Resize { canvas })
        }
        "quit" | "exit" => LoopInput::Quit,
        other => bail!("unknown command `{other}`; expected cw, ccw, resize W H or quit"),
    };

    if let Some(extra) = words.next() {
        bail!("unexpected argument `{extra}` after `{verb}`");
    }
    Ok(Some(input))
}

fn rotate(direction: RotationDirection) -> LoopInput {
    LoopInput::Command(Command::Rotate { direction })
}

fn parse_dimension(word: Option<&str>, name: &str) -> Result<u32> {
    let Some(word) = word else {
        bail!("resize requires a {name}");
    };
    word.parse()
        .with_context(|| format!("invalid {name} `{word}` for resize"))
}
