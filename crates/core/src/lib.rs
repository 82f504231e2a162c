//! Core simulation module - pure, deterministic, and testable
//!
//! This crate contains every game rule of a falling-block round and nothing else.
//! It has **no dependencies** on rendering, input devices, audio or I/O, making it:
//!
//! - **Deterministic**: same seed + rules + input stream produce identical rounds
//! - **Tick-counted**: no wall clock anywhere; the caller decides the tick rate
//! - **Fast**: zero-allocation hot paths for tick processing and snapshots
//!
//! # Module Structure
//!
//! - [`grid`]: 10x20 playfield with boundary-aware reads and row operations
//! - [`rotation`]: shape tables, crawl offsets and the kick search
//! - [`rng`]: token-bag randomizer with convergent fairness
//! - [`rules`]: timing, gravity, randomizer policy and mode as one config value
//! - [`input`]: per-tick button edge latch
//! - [`player`]: the piece state machine and its timers
//! - [`play_state`]: the fixed-order per-tick driver
//! - [`snapshot`]: plain-data output for presentation, with a stable hash
//! - [`replay`]: seed + rules + input stream
//!
//! # Game Rules
//!
//! - **Token-bag randomizer**: every type holds tokens; a draw costs the winner six
//!   and pays every other type one, so droughts end quickly without a fixed bag
//! - **Crawl + kick rotation**: pieces turn around a visual center; L, J, T, S, Z
//!   and O kick when blocked, I never does, and nothing kicks on its spawn tick
//! - **IRS**: a rotation button held at spawn pre-rotates the new piece
//! - **Fixed-point gravity**: 256 subgrid units per row, ramping on every spawn
//! - **Lock delay**: resets on every drop and halves on every new lowest row
//! - **DAS**: a held direction charges, then repeats; the charge survives ARE
//!
//! # Example
//!
//! ```
//! use tetrion_core::{PlayState, Rules};
//! use tetrion_core::types::{Button, InputFrame};
//!
//! let mut play = PlayState::new(12345, Rules::default());
//!
//! let mut frame = InputFrame::new();
//! frame.press(Button::Right);
//! play.tick(&frame);
//!
//! let snapshot = play.snapshot();
//! assert_eq!(snapshot.pieces, 1);
//! assert!(snapshot.active.is_some());
//! ```

pub mod grid;
pub mod input;
pub mod play_state;
pub mod player;
pub mod replay;
pub mod rng;
pub mod rotation;
pub mod rules;
pub mod snapshot;

pub use tetrion_types as types;

// Re-export commonly used types for convenience
pub use grid::Grid;
pub use input::ButtonState;
pub use play_state::PlayState;
pub use player::{Effects, Player};
pub use replay::Replay;
pub use rng::{Randomizer, SimpleRng};
pub use rotation::{shape_of, try_kicks, try_rotate, KickContext, RotateOutcome};
pub use rules::{FirstPiecePolicy, GravityRules, Mode, Rules};
pub use snapshot::{GameSnapshot, HiddenSnapshot, PieceSnapshot};
