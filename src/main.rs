//! Tetrowall headless runner
//!
//! Plays a scripted game against the seeded wall and logs what happens.
//! Usage: `tetrowall [settings.json]` (set `RUST_LOG=debug` for details).

#[cfg(not(target_arch = "wasm32"))]
use tetrowall::Settings;
#[cfg(not(target_arch = "wasm32"))]
use tetrowall::sim::{Engine, GamePhase, Horizontal, InputEvent, Vertical};

/// Simulated frame rate
#[cfg(not(target_arch = "wasm32"))]
const FPS: u32 = 60;

/// Length of the scripted run in seconds
#[cfg(not(target_arch = "wasm32"))]
const RUN_SECONDS: u32 = 120;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tetrowall (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };

    let mut engine = match Engine::from_settings(settings) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let outputs = engine.outputs_mut();
    outputs
        .phase_changed
        .subscribe(|phase| log::info!("Phase: {phase:?}"));
    outputs.score.subscribe(|score| log::info!("Score: {score}"));
    outputs
        .cell_eliminated
        .subscribe(|cell| log::debug!("Eliminated {} at {}", cell.color, cell.position));

    let (score, phase) = run_demo(&mut engine);
    println!("Final score: {score} ({phase:?})");
}

/// Shoot steadily while drifting up and down and turning now and then.
/// Restarts whenever the wall wins.
#[cfg(not(target_arch = "wasm32"))]
fn run_demo(engine: &mut Engine) -> (u64, GamePhase) {
    let dt = 1.0 / FPS as f32;
    let mut best = 0;

    engine.handle(&InputEvent::StartGame);
    for frame in 0..FPS * RUN_SECONDS {
        if engine.state().phase() == GamePhase::GameOver {
            best = best.max(engine.state().score());
            engine.handle(&InputEvent::StartGame);
        }

        engine.handle(&InputEvent::frame(dt));

        if frame % 6 == 0 {
            engine.handle(&InputEvent::Shoot);
        }
        match frame % 240 {
            60 => engine.handle(&InputEvent::moved(Horizontal::None, Vertical::Up)),
            180 => engine.handle(&InputEvent::moved(Horizontal::None, Vertical::Down)),
            // Quick turn to spray the rows above and below
            120 => engine.handle(&InputEvent::Rotate { clockwise: false }),
            126 => engine.handle(&InputEvent::Rotate { clockwise: true }),
            _ => {}
        }
    }

    let state = engine.state();
    (best.max(state.score()), state.phase())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the product on the web; there is no headless runner
}
