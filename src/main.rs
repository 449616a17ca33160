//! Freerun - headless course runner
//!
//! Runs a scripted lap of the parkour course through the full simulation and
//! logs every movement event. Set `RUST_LOG=debug` to see state-machine
//! transitions as well.
//!
//! Usage: `freerun [config.json] [ticks]`

use std::process::ExitCode;

use freerun_game::input::PlayerInput;
use freerun_game::{DashMeter, Level, Simulation, SimulationConfig};

/// Default run length in ticks.
const DEFAULT_TICKS: u64 = 600;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match SimulationConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("{}", err);
                return ExitCode::FAILURE;
            }
        },
        None => SimulationConfig::default(),
    };
    let ticks = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_TICKS);

    log::info!(
        "Freerun starting: {} Hz, {} ticks",
        config.tick_rate,
        ticks
    );

    let mut sim = Simulation::new(config, Level::parkour_course());
    let id = sim.add_player("Runner");

    let mut meter = DashMeter::new();
    if let Some(bus) = sim
        .get_player_mut(id)
        .and_then(|player| player.controller_mut())
        .map(|controller| controller.bus_mut())
    {
        meter.attach(bus);
    }

    for frame in 0..ticks {
        let input = scripted_input(frame, sim.players.first().map(|p| p.position().x));
        for event in sim.tick(&[input]) {
            log::info!("[{:>4}] player {}: {:?}", frame, event.player, event.event);
        }
    }

    if let Some(player) = sim.get_player(id) {
        log::info!(
            "finished at {:?} after {} respawns, dash meter {:.2}",
            player.position(),
            player.respawns,
            meter.fill()
        );
    }

    if let Some(bus) = sim
        .get_player_mut(id)
        .and_then(|player| player.controller_mut())
        .map(|controller| controller.bus_mut())
    {
        meter.detach(bus);
    }

    ExitCode::SUCCESS
}

/// Sprint down the course: dash off the start, jump the pit along the run
/// wall, slide across the landing pad and climb the ledge.
fn scripted_input(frame: u64, x: Option<f32>) -> PlayerInput {
    let mut input = PlayerInput::default();
    input.movement.forward = true;
    input.actions.sprint = true;

    let x = x.unwrap_or(0.0);
    input.actions.dash = frame == 20;
    // Tapping at the ledge jumps from the pad and then mantles in the air
    let tapping = frame % 4 < 2;
    input.actions.jump = (27.0..29.0).contains(&x) || ((77.0..80.0).contains(&x) && tapping);
    input.actions.slide = (55.0..57.0).contains(&x);
    // Lean right toward the run wall over the pit
    input.movement.right = (30.0..45.0).contains(&x);

    input
}
