//! Output event channels
//!
//! Presentation layers (renderer, audio, HUD) subscribe before the first
//! input is handled. Emission is synchronous: subscribers run in the order
//! they subscribed, inside the step that produced the event.

use std::fmt;

use glam::{IVec2, Vec2};

use super::shape::PlayerShape;
use super::state::{Cell, Color, GamePhase};

/// A single typed event stream with any number of subscribers
pub struct Channel<T: ?Sized> {
    subscribers: Vec<Box<dyn FnMut(&T)>>,
}

impl<T: ?Sized> Channel<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&T) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn emit(&mut self, value: &T) {
        for subscriber in &mut self.subscribers {
            subscriber(value);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: ?Sized> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Every stream the engine publishes
#[derive(Debug, Default)]
pub struct Outputs {
    /// Grid size of the new game
    pub game_started: Channel<IVec2>,
    /// A cell was colored (frozen projectile, game-over stamp)
    pub new_cell: Channel<Cell>,
    /// The wall scrolled; payload is the new rightmost column, bottom to top
    pub table_scrolled: Channel<[Option<Color>]>,
    pub player_shape_updated: Channel<PlayerShape>,
    /// Direction of the new projectile
    pub shot_fired: Channel<IVec2>,
    /// Rotation request accepted; payload is `clockwise`
    pub rotated: Channel<bool>,
    pub cell_eliminated: Channel<Cell>,
    /// Projectile position, only meaningful within the current frame
    pub projectile_position: Channel<Vec2>,
    /// Cell where a projectile froze
    pub frozen_at: Channel<IVec2>,
    pub score: Channel<u64>,
    pub phase_changed: Channel<GamePhase>,
    /// Seconds processed by a frame tick
    pub frame_elapsed: Channel<f32>,
}

#[cfg(test)]
pub(crate) fn record<T: Clone + 'static>(
    channel: &mut Channel<T>,
) -> std::rc::Rc<std::cell::RefCell<Vec<T>>> {
    let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = std::rc::Rc::clone(&log);
    channel.subscribe(move |v: &T| sink.borrow_mut().push(v.clone()));
    log
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn subscribers_run_in_subscription_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut channel: Channel<u64> = Channel::new();
        for id in 0..3 {
            let order = Rc::clone(&order);
            channel.subscribe(move |v| order.borrow_mut().push((id, *v)));
        }
        channel.emit(&7);
        assert_eq!(*order.borrow(), vec![(0, 7), (1, 7), (2, 7)]);
        assert_eq!(channel.subscriber_count(), 3);
    }

    #[test]
    fn unsized_payloads_are_supported() {
        let mut outputs = Outputs::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        outputs
            .table_scrolled
            .subscribe(move |col: &[Option<Color>]| sink.borrow_mut().push(col.to_vec()));
        outputs.table_scrolled.emit(&[None, Some(Color::Red)]);
        assert_eq!(*seen.borrow(), vec![vec![None, Some(Color::Red)]]);
    }

    #[test]
    fn record_helper_collects_values() {
        let mut channel: Channel<bool> = Channel::new();
        let log = record(&mut channel);
        channel.emit(&true);
        channel.emit(&false);
        assert_eq!(*log.borrow(), vec![true, false]);
    }
}
