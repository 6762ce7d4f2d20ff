#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Nightmare Dorm session.

mod autoplay;
mod config_file;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use nightmare_dorm_core::{Event, MemoryStore, RoomId};
use nightmare_dorm_session::Session;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{autoplay::Autoplay, config_file::RunFile};

const BANNER: &str = "Welcome to Nightmare Dorm.";

/// Runs one session from room selection to its outcome.
#[derive(Parser, Debug)]
#[command(name = "nightmare-dorm")]
#[command(about = "Run a headless Nightmare Dorm session and print the outcome")]
struct Args {
    /// TOML run file with session, talent and bee coin overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed, overriding the run file
    #[arg(long)]
    seed: Option<u64>,

    /// Seconds the player must survive, overriding the run file
    #[arg(long)]
    duration: Option<f32>,

    /// Simulated milliseconds per tick
    #[arg(long, default_value_t = 100)]
    dt_ms: u64,

    /// Room to claim at once instead of waiting for random assignment
    #[arg(long)]
    room: Option<u32>,

    /// Let the autopilot spend the player's gold
    #[arg(long, default_value_t = false)]
    autoplay: bool,

    /// Log simulation detail
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

/// Entry point for the Nightmare Dorm command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut file = match &args.config {
        Some(path) => RunFile::load(path)?,
        None => RunFile::default(),
    };
    if let Some(seed) = args.seed {
        file.session.seed = seed;
    }
    if let Some(duration) = args.duration {
        file.session.survival_secs = duration;
    }
    if args.dt_ms == 0 {
        bail!("--dt-ms must be greater than zero");
    }

    let store = file.store();
    let mut autoplay = args
        .autoplay
        .then(|| Autoplay::new(file.session.autopilot.clone()));
    let limit = f64::from(file.session.selection_secs + file.session.survival_secs) + 1.0;
    let mut session = Session::new(file.session, store);
    println!("{BANNER}");

    if let Some(room) = args.room {
        let receipt = session
            .select_room(RoomId::new(room))
            .with_context(|| format!("cannot claim room {room}"))?;
        info!(?receipt, "room selected");
    }

    let dt = Duration::from_millis(args.dt_ms);
    let mut elapsed = 0.0;
    while !session.phase().is_terminal() {
        if elapsed > limit {
            bail!("session did not finish within {limit:.1} simulated seconds");
        }
        for event in session.tick(dt) {
            report(&event);
        }
        if let Some(autoplay) = autoplay.as_mut() {
            autoplay.step(&mut session, dt);
        }
        elapsed += dt.as_secs_f64();
    }

    summarise(&session);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "nightmare_dorm=debug"
    } else {
        "nightmare_dorm=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn report(event: &Event) {
    match event {
        Event::IntrudersAwakened => println!("The intruders have awakened."),
        Event::WaveStarted { wave, intruders } => {
            println!("Wave {wave}: {intruders} intruder(s) enter the dorm.");
        }
        Event::RoomBroken { room } => println!("The door of room {} gave way.", room.get()),
        Event::OccupantEliminated { message, .. } => println!("{message}"),
        other => debug!(event = ?other, "simulation event"),
    }
}

fn summarise(session: &Session<MemoryStore>) {
    println!("Outcome: {:?}", session.phase());
    println!("Survived: {:.1}s", session.survival_secs());
    println!("Waves: {}", session.wave());
    println!("Kills: {}", session.kills());
    println!("Gold: {:.0}", session.gold());
    if let Some(reward) = session.bee_reward() {
        println!("Bee reward: {reward}");
    }

    let survivors: Vec<String> = session
        .occupant_view()
        .iter()
        .filter(|occupant| occupant.alive)
        .map(|occupant| occupant.name.clone())
        .collect();
    println!("Still resting: {}", survivors.join(", "));
    println!("Bee coins banked: {}", session.store().bee_coins());
}
