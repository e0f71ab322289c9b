use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::config::GameProperties;
use crate::context::GameContext;
use crate::events::EngineEvent;
use crate::game_state::GameState;

/// Number of game loop iterations per second.
/// This is a multiple of common frame rates.
const TICKS_PER_SECOND: u32 = 240;

/// Duration of each game tick. Same as
/// `Duration::from_secs_f64(f64::from(TICKS_PER_SECOND).recip())`
/// but with const support
const TICK_DURATION: Duration = Duration::from_nanos(
    (1_000_000_000_u64 + TICKS_PER_SECOND as u64 / 2) / TICKS_PER_SECOND as u64,
);

/// The root object of a running engine
pub struct GameLoop {
    /// Contains the current state which will be updated by the game loop.
    /// This might be shared with renderers.
    /// In order to allow multiple renderers, this is a `RwLock` rather than a `Mutex`.
    game_state: Arc<RwLock<GameState>>,
    context: GameContext,
}

impl GameLoop {
    #[must_use]
    pub fn new(properties: GameProperties) -> Self {
        let context = GameContext::new(
            i64::from(properties.window_width),
            i64::from(properties.window_height),
        );
        Self {
            game_state: Arc::new(RwLock::new(GameState::new(properties))),
            context,
        }
    }

    /// Runs until an [`EngineEvent::Exit`] arrives or the sender hangs up.
    /// Each iteration drains the pending host events into the context and
    /// steps the simulation once, then sleeps to the next tick.
    pub fn run(mut self, event_source: &Receiver<EngineEvent>) {
        let mut time = Instant::now();
        'game_loop: loop {
            {
                let mut game_state = self.game_state.write().unwrap();
                'next_event: loop {
                    match event_source.try_recv() {
                        Ok(engine_event) => match engine_event {
                            EngineEvent::Key { code, state } => {
                                self.context.set_key_state(code, state);
                            }
                            EngineEvent::MouseMoved { position } => {
                                self.context.update_mouse_position(position);
                            }
                            EngineEvent::MouseScrolled { offset } => {
                                self.context.set_mouse_scroll(offset);
                            }
                            EngineEvent::WindowResized { width, height } => {
                                self.context.set_window_size(width, height);
                            }
                            EngineEvent::Exit => {
                                debug!("Received Exit-event. Exiting game loop");
                                break 'game_loop;
                            }
                        },
                        Err(TryRecvError::Disconnected) => {
                            debug!("Event source disconnected. Exiting game loop");
                            break 'game_loop;
                        }
                        Err(TryRecvError::Empty) => break 'next_event,
                    }
                }

                self.context.set_delta_time(TICK_DURATION.as_secs_f64());
                game_state.update(&mut self.context);
            }

            // compute the timestamp of the next game loop iteration
            time += TICK_DURATION;
            if let Some(delay) = time.checked_duration_since(Instant::now()) {
                thread::sleep(delay);
            } else {
                // game loop is running too slow
            }
        }
    }

    #[must_use]
    pub fn clone_state(&self) -> Arc<RwLock<GameState>> {
        Arc::clone(&self.game_state)
    }

    #[must_use]
    pub fn context(&self) -> &GameContext {
        &self.context
    }
}
