#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that renders Conga robot vacuum maps to SVG.

mod args;
mod config;
mod input;
mod snapshot;

use std::sync::mpsc;

use anyhow::{Context, Result};
use clap::Parser;
use conga_map_core::{Command, Event};
use conga_map_rendering::{validate_canvas, Palette, Presentation, RenderingBackend};
use conga_map_rendering_svg::SvgBackend;
use conga_map_viewer::{self as viewer, query, Viewer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    args::{CliArgs, Mode, Settings},
    config::ViewerConfig,
    input::{read_status, spawn_console_reader, spawn_status_poller, LoopInput},
    snapshot::MapSnapshot,
};

const DEFAULT_LOG_FILTER: &str = "conga_map=info";

/// Entry point for the Conga map command-line interface.
fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = CliArgs::parse();
    let config = ViewerConfig::resolve(cli.config.as_deref())?;

    match cli.mode {
        Mode::Render(overrides) => render(Settings::resolve(config, overrides, None)),
        Mode::Watch {
            overrides,
            interval_ms,
        } => watch(Settings::resolve(config, overrides, interval_ms)),
    }
}

fn render(settings: Settings) -> Result<()> {
    let canvas = validate_canvas(settings.canvas)?;
    let payload = read_status(&settings.status_path)?;

    let mut viewer = Viewer::with_settings(settings.orientation, canvas);
    let mut events = Vec::new();
    viewer::apply(&mut viewer, Command::Ingest { payload }, &mut events);

    for event in events {
        match event {
            Event::PayloadRejected { reason } => {
                return Err(reason).with_context(|| {
                    format!(
                        "status document at {} was rejected",
                        settings.status_path.display()
                    )
                });
            }
            Event::MapUnavailable => warn!("status carries no map yet; writing an empty frame"),
            _ => {}
        }
    }

    let mut backend = SvgBackend::new(&settings.svg_path);
    present(&viewer, &mut backend)?;
    write_snapshot(&viewer, &settings)?;
    info!(path = %settings.svg_path.display(), "map rendered");
    Ok(())
}

fn watch(settings: Settings) -> Result<()> {
    let canvas = validate_canvas(settings.canvas)?;
    let (sender, receiver) = mpsc::channel();
    let _poller = spawn_status_poller(
        settings.status_path.clone(),
        settings.poll_interval,
        sender.clone(),
    )?;
    let _console = spawn_console_reader(sender)?;

    info!(
        status = %settings.status_path.display(),
        output = %settings.svg_path.display(),
        interval_ms = u64::try_from(settings.poll_interval.as_millis()).unwrap_or(u64::MAX),
        "watching status document"
    );

    let mut viewer = Viewer::with_settings(settings.orientation, canvas);
    let mut backend = SvgBackend::new(&settings.svg_path);
    let mut events = Vec::new();

    while let Ok(input) = receiver.recv() {
        let command = match input {
            LoopInput::Command(command) => command,
            LoopInput::Quit => break,
        };

        events.clear();
        viewer::apply(&mut viewer, command, &mut events);
        if !events.iter().any(Event::requires_redraw) {
            continue;
        }

        if let Err(error) = present(&viewer, &mut backend) {
            error!("{error:#}");
        }
        if events
            .iter()
            .any(|event| matches!(event, Event::MapReplaced { .. }))
        {
            if let Err(error) = write_snapshot(&viewer, &settings) {
                error!("{error:#}");
            }
        }
    }

    info!(frames = backend.frames_written(), "viewer stopped");
    Ok(())
}

fn present(viewer: &Viewer, backend: &mut impl RenderingBackend) -> Result<()> {
    let orientation = query::orientation(viewer);
    let presentation = Presentation::new(
        format!("Conga map ({orientation})"),
        query::canvas(viewer),
        Palette::default(),
        query::scene(viewer),
    );
    backend.present(&presentation)
}

fn write_snapshot(viewer: &Viewer, settings: &Settings) -> Result<()> {
    let (Some(path), Some(map)) = (&settings.json_path, query::decoded_map(viewer)) else {
        return Ok(());
    };
    MapSnapshot::new(map, query::orientation(viewer)).write_to(path)
}
