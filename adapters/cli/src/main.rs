#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Popcorn session headlessly.

mod config;
mod pilot;
mod simulation;
mod summary;

use std::{cell::RefCell, rc::Rc};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use popcorn_rendering::{Presentation, RenderingBackend, Scene};
use popcorn_rendering_headless::HeadlessBackend;

use crate::{
    config::{CliArgs, RunConfig},
    pilot::Pilot,
    simulation::Simulation,
    summary::RunSummary,
};

/// Entry point for the Popcorn command-line interface.
fn main() -> Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    let config = RunConfig::resolve(args).context("invalid configuration")?;

    let simulation = Rc::new(RefCell::new(Simulation::new(&config)));
    let scene = {
        let simulation = simulation.borrow();
        info!("{}", simulation.banner());
        let mut scene = Scene::new(simulation.geometry(), config.theme)
            .context("failed to build the initial scene")?;
        simulation
            .populate(&mut scene)
            .context("failed to populate the initial scene")?;
        scene
    };

    let palette = config.theme.theme();
    info!(
        "theme {} ({}), pilot {:?}, seed {}",
        config.theme, palette.name, config.pilot, config.seed
    );
    let presentation = Presentation::new("Popcorn", palette.background, scene);
    let backend = HeadlessBackend::new(
        config.frames,
        config.frame_dt,
        Pilot::new(config.pilot, config.seed),
    );

    let frame_simulation = Rc::clone(&simulation);
    backend
        .run(presentation, move |dt, input, scene| {
            let mut simulation = frame_simulation.borrow_mut();
            simulation.step(dt, input);
            if let Err(refresh_error) = simulation.populate(scene) {
                error!("scene refresh failed: {refresh_error}");
            }
        })
        .context("headless backend failed")?;

    let simulation = simulation.borrow();
    let summary = RunSummary::new(&simulation.snapshot(), simulation.stats(), &config);
    if config.json {
        println!("{}", summary.to_json().context("failed to encode summary")?);
    } else {
        println!("{summary}");
    }

    Ok(())
}
