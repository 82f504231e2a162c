//! Play state module - the per-tick simulation driver
//!
//! [`PlayState`] owns the grid, the player, the randomizer and the input latch and
//! advances them in a fixed order once per tick:
//!
//! 1. merge the tick's button edges;
//! 2. apply rotation presses, in the order they happened;
//! 3. direct shift, then autoshift;
//! 4. clear delay;
//! 5. spawn delay (ARE);
//! 6. gravity;
//! 7. lock delay;
//! 8. mode goals, then `Spawned → Active`.
//!
//! The order is part of the contract: replays only reproduce if it never changes.
//!
//! # Example
//!
//! ```
//! use tetrion_core::{PlayState, Rules};
//! use tetrion_core::types::{Button, InputFrame, PlayerState};
//!
//! let mut play = PlayState::new(12345, Rules::default());
//!
//! // The first tick spawns immediately.
//! play.tick(&InputFrame::new());
//! assert_eq!(play.player().state(), PlayerState::Active);
//!
//! let mut frame = InputFrame::new();
//! frame.press(Button::HardDrop);
//! let effects = play.tick(&frame);
//! assert!(!effects.is_empty());
//! assert_eq!(play.player().state(), PlayerState::Spawn);
//! ```

use log::debug;

use crate::grid::Grid;
use crate::input::ButtonState;
use crate::player::{Effects, Player};
use crate::rng::Randomizer;
use crate::rules::{FirstPiecePolicy, Mode, Rules};
use crate::snapshot::{GameSnapshot, HiddenSnapshot, PieceSnapshot, TimersSnapshot};
use crate::types::{Button, Edge, InputFrame, Outcome, PieceType};

/// Pieces that cannot start a round under [`FirstPiecePolicy::AvoidSzo`]
const SZO: [PieceType; 3] = [PieceType::S, PieceType::Z, PieceType::O];

/// One round of play
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayState {
    grid: Grid,
    player: Player,
    randomizer: Randomizer,
    buttons: ButtonState,
    rules: Rules,
    seed: u32,
    /// Current gravity in subgrid units per tick
    gravity: u32,
    tick: u64,
    lines: u32,
    pieces: u32,
    outcome: Option<Outcome>,
}

impl PlayState {
    /// Start a round on an empty grid
    pub fn new(seed: u32, rules: Rules) -> Self {
        let randomizer = Randomizer::new(seed, rules.starting_tokens);
        Self::from_parts(rules, Grid::new(), randomizer)
    }

    /// Start a round from a prepared grid and randomizer
    pub fn from_parts(rules: Rules, grid: Grid, mut randomizer: Randomizer) -> Self {
        let seed = randomizer.seed();
        let first = match rules.first_piece {
            FirstPiecePolicy::Any => randomizer.next(),
            FirstPiecePolicy::AvoidSzo => randomizer.next_excluding(&SZO),
        };
        debug!(
            "round start: seed={seed} mode={:?} first={}",
            rules.mode,
            first.as_str()
        );

        Self {
            grid,
            player: Player::new(first),
            randomizer,
            buttons: ButtonState::new(),
            rules,
            seed,
            gravity: rules.gravity.initial,
            tick: 0,
            lines: 0,
            pieces: 0,
            outcome: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn randomizer(&self) -> &Randomizer {
        &self.randomizer
    }

    pub fn buttons(&self) -> &ButtonState {
        &self.buttons
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn gravity(&self) -> u32 {
        self.gravity
    }

    /// Ticks simulated so far
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    /// Pieces spawned so far
    pub fn pieces(&self) -> u32 {
        self.pieces
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn ghost_y(&self) -> Option<i8> {
        self.player.ghost_y(&self.grid)
    }

    /// Advance one tick. Does nothing once the round has an outcome.
    pub fn tick(&mut self, frame: &InputFrame) -> Effects {
        let mut effects = Effects::new();
        if self.outcome.is_some() {
            return effects;
        }
        self.tick += 1;

        self.buttons.merge(frame);
        self.player.track_direction(&self.buttons);

        for event in frame.events() {
            if event.edge != Edge::Pressed {
                continue;
            }
            if let Some(turn) = event.button.turn() {
                self.player.rotate(&self.grid, turn);
            }
        }

        self.player
            .update_shift(&self.grid, &self.buttons, &self.rules, &mut effects);

        self.lines += self
            .player
            .update_clear(&mut self.grid, &self.rules, &mut effects);

        if self.player.update_spawn_delay(&self.rules, &self.buttons) {
            self.spawn();
        }

        let soft_drop = self.buttons.is_held(Button::SoftDrop);
        let hard_drop = self.buttons.is_held(Button::HardDrop);
        let rate = self.rules.gravity.rate(self.gravity, soft_drop, hard_drop);
        self.player.apply_gravity(&self.grid, rate, soft_drop);

        self.player
            .update_lock(&mut self.grid, &self.rules, hard_drop, &mut effects);

        self.check_goal();
        self.player.activate();
        effects
    }

    /// By-value form of [`tick`](Self::tick)
    pub fn advance(mut self, frame: &InputFrame) -> (Self, Effects) {
        let effects = self.tick(frame);
        (self, effects)
    }

    fn spawn(&mut self) {
        let next = self.randomizer.next();
        if self.player.spawn_piece(&self.grid, next, &self.buttons) {
            self.pieces += 1;
            self.gravity = self.rules.gravity.ramp(self.gravity);
        } else {
            debug!(
                "topped out at tick {} after {} pieces, {} lines",
                self.tick, self.pieces, self.lines
            );
            self.outcome = Some(Outcome::ToppedOut);
        }
    }

    fn check_goal(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        match self.rules.mode {
            Mode::Marathon => {}
            Mode::Sprint { lines } => {
                if self.lines >= lines {
                    debug!("sprint completed at tick {}", self.tick);
                    self.outcome = Some(Outcome::Completed);
                }
            }
            Mode::TimeLimit { ticks } => {
                if self.tick >= ticks {
                    debug!("time limit reached with {} lines", self.lines);
                    self.outcome = Some(Outcome::TimeUp);
                }
            }
        }
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.grid.write_rows(&mut out.grid);

        out.state = self.player.state();
        out.active = self.player.piece().map(|piece| {
            let (x, y) = self.player.position();
            PieceSnapshot {
                piece,
                spin: self.player.spin(),
                x,
                y,
            }
        });
        out.ghost_y = self.ghost_y();
        out.preview = self.player.preview();
        out.gravity = self.gravity;
        out.tick = self.tick;
        out.lines = self.lines;
        out.pieces = self.pieces;
        out.outcome = self.outcome;
        out.timers = TimersSnapshot {
            y_sub: self.player.y_sub(),
            lock_delay: self.player.lock_delay(),
            clear_delay: self.player.clear_delay(),
            spawn_delay: self.player.spawn_delay(),
            autoshift_charge: self.player.autoshift_charge(),
        };
        out.hidden = HiddenSnapshot {
            tokens: *self.randomizer.tokens(),
            rng_state: self.randomizer.seed(),
            y_lowest: self.player.y_lowest(),
            last_direction: self.player.last_direction(),
            autoshift_direction: self.player.autoshift_direction(),
            autoshift_delay: self.player.autoshift_delay(),
            drop_bonus: self.player.drop_bonus(),
            held_buttons: self.buttons.held_bits(),
        };
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

impl Default for PlayState {
    fn default() -> Self {
        Self::new(1, Rules::default())
    }
}
