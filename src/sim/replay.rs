//! Input event logging and replay
//!
//! The engine is a pure function of its settings, its generator seed and
//! the inputs it handled. Recording the inputs is enough to reproduce a run.

use serde::{Deserialize, Serialize};

use super::tick::{Engine, InputEvent};

/// Ordered list of handled inputs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputLog {
    events: Vec<InputEvent>,
}

impl InputLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Feed every recorded input into `engine`, in order
    pub fn replay(&self, engine: &mut Engine) {
        log::debug!("Replaying {} inputs", self.events.len());
        for event in &self.events {
            engine.handle(event);
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl FromIterator<InputEvent> for InputLog {
    fn from_iter<I: IntoIterator<Item = InputEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tick::tests::snapshot;
    use crate::sim::tick::{Horizontal, Vertical};
    use crate::Settings;

    #[test]
    fn recording_captures_every_input() {
        let mut engine = Engine::from_settings(Settings::default()).unwrap();
        assert!(engine.input_log().is_none());

        engine.record_inputs();
        engine.handle(&InputEvent::StartGame);
        engine.handle(&InputEvent::Shoot);
        engine.handle(&InputEvent::frame(0.25));

        let log = engine.input_log().unwrap();
        assert_eq!(
            log.events(),
            &[
                InputEvent::StartGame,
                InputEvent::Shoot,
                InputEvent::frame(0.25)
            ]
        );
    }

    #[test]
    fn replay_reproduces_the_run() {
        let settings = Settings {
            wall_fill_chance: 0.6,
            ..Settings::default()
        };

        let mut original = Engine::from_settings(settings.clone()).unwrap();
        original.record_inputs();
        original.handle(&InputEvent::StartGame);
        for i in 0..900 {
            original.handle(&InputEvent::frame(1.0 / 60.0));
            match i % 40 {
                0 => original.handle(&InputEvent::Shoot),
                10 => original.handle(&InputEvent::Rotate { clockwise: i % 80 == 10 }),
                20 => original.handle(&InputEvent::moved(Horizontal::Right, Vertical::Up)),
                30 => original.handle(&InputEvent::moved(Horizontal::Left, Vertical::Down)),
                _ => {}
            }
        }

        let json = original.input_log().unwrap().to_json().unwrap();
        let log = InputLog::from_json(&json).unwrap();
        assert_eq!(log.len(), original.input_log().unwrap().len());

        let mut copy = Engine::from_settings(settings).unwrap();
        log.replay(&mut copy);

        assert_eq!(snapshot(&copy), snapshot(&original));
        assert_eq!(copy.state().score(), original.state().score());
        assert_eq!(copy.state().phase(), original.state().phase());
        assert_eq!(copy.state().shape(), original.state().shape());
    }

    #[test]
    fn collected_logs_replay_like_recorded_ones() {
        let log: InputLog = [InputEvent::StartGame, InputEvent::frame(1.0)]
            .into_iter()
            .collect();
        let mut engine = Engine::from_settings(Settings::default()).unwrap();
        log.replay(&mut engine);
        assert!((engine.state().time - 1.0).abs() < 1e-5);
    }
}
