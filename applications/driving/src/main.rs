//! Drives the engine without a window: scripted input events stand in for
//! the keyboard, and telemetry goes to the log instead of the screen.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use engine_driving::{
    EngineEvent, GameLoop, GameProperties, GameState, KeyCode, KeyState, RenderState,
};
use log::info;

fn main() -> anyhow::Result<ExitCode> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_indent(Some(0))
        .init();

    let properties_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("properties.json"), PathBuf::from);
    let properties = GameProperties::load(&properties_path);
    info!(
        "scene: {} bots, {} trees",
        properties.bots_count, properties.trees_count
    );

    let game_loop = GameLoop::new(properties);
    let game_state = game_loop.clone_state();
    let (sender, receiver) = mpsc::channel();
    let loop_handle = thread::Builder::new()
        .name("game-loop".to_owned())
        .spawn(move || game_loop.run(&receiver))
        .context("couldn't spawn the game loop thread")?;

    drive_demo(&sender, &game_state)?;

    sender
        .send(EngineEvent::Exit)
        .context("the game loop hung up early")?;
    loop_handle
        .join()
        .map_err(|_| anyhow::anyhow!("the game loop thread panicked"))?;

    info!("demo finished");
    Ok(ExitCode::SUCCESS)
}

/// A short scripted run: floor it, glance at the telemetry, steer, brake.
fn drive_demo(
    sender: &Sender<EngineEvent>,
    game_state: &Arc<RwLock<GameState>>,
) -> anyhow::Result<()> {
    let press = |code| EngineEvent::Key {
        code,
        state: KeyState::Press,
    };
    let release = |code| EngineEvent::Key {
        code,
        state: KeyState::Release,
    };

    // full throttle; the headlights are already on
    sender.send(press(KeyCode::W))?;
    thread::sleep(Duration::from_secs(3));
    log_telemetry(game_state, "after 3 s at full throttle");

    // ease into a left curve
    sender.send(press(KeyCode::A))?;
    thread::sleep(Duration::from_secs(1));
    sender.send(release(KeyCode::A))?;
    log_telemetry(game_state, "after 1 s of steering left");

    // off the gas, on the brake
    sender.send(release(KeyCode::W))?;
    sender.send(press(KeyCode::Space))?;
    thread::sleep(Duration::from_secs(2));
    sender.send(release(KeyCode::Space))?;
    log_telemetry(game_state, "after 2 s of braking");

    Ok(())
}

fn log_telemetry(game_state: &Arc<RwLock<GameState>>, label: &str) {
    let game_state = game_state.read().unwrap();
    let map = &game_state.map;
    let position = map.player_position().unwrap_or_default();
    let speed = map.player_speed().unwrap_or_default();

    // snapshot exactly what a renderer would consume
    let render_state = RenderState::new(&game_state);

    info!(
        "{label}: tick {}, position ({:.1}, {:.1}, {:.1}), speed {speed:.1}, \
         fov {:.1}, {} instances, {} active lights, shadow pass {}",
        game_state.tick().0,
        position.x,
        position.y,
        position.z,
        render_state.fov,
        render_state.instances.len(),
        render_state.light_count,
        if render_state.sun_shadow_matrix.is_some() {
            "on"
        } else {
            "off"
        },
    );
}
