//! Input latch - folds per-tick edge events into button levels
//!
//! The simulation reads three views of the buttons each tick: which are held,
//! which were pressed during this tick, and which were released during this tick.
//! All three are packed into `u8` bitsets using [`Button::bit`].
//!
//! Left and Right may be held together. The effective horizontal direction is the
//! one pressed most recently; releasing it hands control back to the other one if
//! that is still held.

use crate::types::{Button, Direction, Edge, InputFrame};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ButtonState {
    held: u8,
    pressed: u8,
    released: u8,
    horizontal: Option<Direction>,
}

impl ButtonState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one tick of events, in order. Clears the previous tick's edges.
    pub fn merge(&mut self, frame: &InputFrame) {
        self.pressed = 0;
        self.released = 0;

        for event in frame.events() {
            let bit = event.button.bit();
            match event.edge {
                Edge::Pressed => {
                    debug_assert!(
                        self.held & bit == 0,
                        "{:?} pressed while already held",
                        event.button
                    );
                    self.held |= bit;
                    self.pressed |= bit;
                    if let Some(direction) = event.button.direction() {
                        self.horizontal = Some(direction);
                    }
                }
                Edge::Released => {
                    self.held &= !bit;
                    self.released |= bit;
                    if let Some(direction) = event.button.direction() {
                        if self.horizontal == Some(direction) {
                            let other = direction.opposite();
                            self.horizontal = self.is_held(other.button()).then_some(other);
                        }
                    }
                }
            }
        }
    }

    pub fn is_held(&self, button: Button) -> bool {
        self.held & button.bit() != 0
    }

    /// Pressed during the last merged tick
    pub fn is_pressed(&self, button: Button) -> bool {
        self.pressed & button.bit() != 0
    }

    pub fn is_released(&self, button: Button) -> bool {
        self.released & button.bit() != 0
    }

    /// Effective horizontal direction, if any
    pub fn direction(&self) -> Option<Direction> {
        self.horizontal
    }

    /// Effective direction if it was pressed this tick
    pub fn fresh_direction(&self) -> Option<Direction> {
        self.horizontal
            .filter(|direction| self.is_pressed(direction.button()))
    }

    /// Any rotation button or HardDrop pressed this tick
    pub fn any_fresh_spawn_trigger(&self) -> bool {
        [Button::RotCw, Button::RotCcw, Button::RotCcw2, Button::HardDrop]
            .iter()
            .any(|&b| self.is_pressed(b))
    }

    pub fn held_bits(&self) -> u8 {
        self.held
    }

    /// Forget everything, as if all buttons were released
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
