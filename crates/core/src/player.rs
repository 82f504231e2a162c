//! Player module - the piece state machine and its timers
//!
//! A [`Player`] owns everything about the piece currently in play and the delays
//! between pieces. It never owns the grid or the randomizer: the driver lends the
//! grid to every call and hands over the next preview on spawn.
//!
//! # State machine
//!
//! ```text
//! None ──► Spawned ──► Active ──► Clear ──► Spawn ──► Spawned ──► …
//!             │           └───────────────────▲
//!             └──► GameOver
//! ```
//!
//! `Spawned` lasts exactly one tick. It is the IRS window: a rotation applied while
//! spawning never kicks.
//!
//! # Timers
//!
//! | Timer | Counts | Fires when |
//! |-------|--------|------------|
//! | `y_sub` | gravity units | reaches [`SUBGRID_UNIT`], one row per unit |
//! | `lock_delay` | grounded ticks | exceeds `Rules::lock_delay` |
//! | `clear_delay` | ticks in `Clear` | reaches `Rules::clear_delay` |
//! | `spawn_delay` | ticks in `Spawn` | reaches `Rules::spawn_delay` |
//! | `autoshift_charge` | ticks a direction is held | reaches `Rules::das_charge` |

use arrayvec::ArrayVec;
use log::trace;

use crate::grid::Grid;
use crate::input::ButtonState;
use crate::rotation::{shape_of, try_rotate, KickContext, MinoOffset, PieceShape, RotateOutcome};
use crate::rules::Rules;
use crate::types::{
    Button, Direction, Effect, PieceType, PlayerState, Spin, Turn, SPAWN_X, SPAWN_Y, SUBGRID_UNIT,
};

/// Cosmetic events produced by one tick
pub type Effects = ArrayVec<Effect, 16>;

fn emit(effects: &mut Effects, effect: Effect) {
    // capacity covers the worst tick (slide, flash, four clears, four thumps)
    let _ = effects.try_push(effect);
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Player {
    state: PlayerState,
    position: MinoOffset,
    spin: Spin,
    piece: PieceType,
    preview: PieceType,
    /// Fixed-point gravity accumulator
    y_sub: u32,
    /// Lowest row the current piece has reached
    y_lowest: i8,
    lock_delay: u32,
    clear_delay: u32,
    spawn_delay: u32,
    autoshift_charge: u32,
    autoshift_delay: u32,
    autoshift_direction: Option<Direction>,
    /// Kick preference
    last_direction: Direction,
    /// Rows fallen under soft drop by the current piece
    drop_bonus: u32,
    /// Full rows waiting for the clear delay, ascending
    cleared_rows: ArrayVec<i8, 4>,
}

impl Player {
    /// A player with nothing on the field, waiting to spawn `preview`
    pub fn new(preview: PieceType) -> Self {
        Self {
            state: PlayerState::None,
            position: (SPAWN_X, SPAWN_Y),
            spin: Spin::R0,
            piece: preview,
            preview,
            y_sub: 0,
            y_lowest: SPAWN_Y,
            lock_delay: 0,
            clear_delay: 0,
            spawn_delay: 0,
            autoshift_charge: 0,
            autoshift_delay: 0,
            autoshift_direction: None,
            last_direction: Direction::Right,
            drop_bonus: 0,
            cleared_rows: ArrayVec::new(),
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn position(&self) -> MinoOffset {
        self.position
    }

    pub fn spin(&self) -> Spin {
        self.spin
    }

    /// The piece in play, if any
    pub fn piece(&self) -> Option<PieceType> {
        self.state.has_piece().then_some(self.piece)
    }

    pub fn preview(&self) -> PieceType {
        self.preview
    }

    pub fn y_sub(&self) -> u32 {
        self.y_sub
    }

    pub fn y_lowest(&self) -> i8 {
        self.y_lowest
    }

    pub fn lock_delay(&self) -> u32 {
        self.lock_delay
    }

    pub fn clear_delay(&self) -> u32 {
        self.clear_delay
    }

    pub fn spawn_delay(&self) -> u32 {
        self.spawn_delay
    }

    pub fn autoshift_charge(&self) -> u32 {
        self.autoshift_charge
    }

    pub fn autoshift_delay(&self) -> u32 {
        self.autoshift_delay
    }

    pub fn autoshift_direction(&self) -> Option<Direction> {
        self.autoshift_direction
    }

    pub fn last_direction(&self) -> Direction {
        self.last_direction
    }

    pub fn drop_bonus(&self) -> u32 {
        self.drop_bonus
    }

    pub fn cleared_rows(&self) -> &[i8] {
        &self.cleared_rows
    }

    pub fn shape(&self) -> PieceShape {
        shape_of(self.piece, self.spin)
    }

    /// Absolute cells of the piece at its current position
    pub fn cells(&self) -> [MinoOffset; 4] {
        let (x, y) = self.position;
        self.shape().map(|(dx, dy)| (x + dx, y + dy))
    }

    /// Bring `preview` into play at the spawn cell and queue `next` behind it.
    ///
    /// Applies IRS if a rotation button is held. Returns false, leaving the player
    /// in `GameOver`, if the new piece overlaps the stack.
    pub fn spawn_piece(&mut self, grid: &Grid, next: PieceType, buttons: &ButtonState) -> bool {
        self.state = PlayerState::Spawned;
        self.position = (SPAWN_X, SPAWN_Y);
        self.piece = self.preview;
        self.preview = next;
        self.y_sub = 0;
        self.lock_delay = 0;
        self.spawn_delay = 0;
        self.clear_delay = 0;
        self.drop_bonus = 0;
        self.spin = Spin::R0;
        self.y_lowest = SPAWN_Y;
        self.cleared_rows.clear();

        let irs = if buttons.is_held(Button::RotCcw) || buttons.is_held(Button::RotCcw2) {
            Some(Turn::Ccw)
        } else if buttons.is_held(Button::RotCw) {
            Some(Turn::Cw)
        } else {
            None
        };
        if let Some(turn) = irs {
            self.rotate(grid, turn);
        }

        if grid.overlaps(self.position, &self.shape()) {
            self.state = PlayerState::GameOver;
            return false;
        }
        true
    }

    /// End of the spawning tick
    pub fn activate(&mut self) {
        if self.state == PlayerState::Spawned {
            self.state = PlayerState::Active;
        }
    }

    /// Move one column. Reverts and returns false on overlap.
    pub fn shift(&mut self, grid: &Grid, direction: Direction) -> bool {
        if !self.state.has_piece() {
            return false;
        }
        let moved = (self.position.0 + direction.dx(), self.position.1);
        if grid.overlaps(moved, &self.shape()) {
            return false;
        }
        self.position = moved;
        true
    }

    /// Remember the effective horizontal direction as the kick preference
    pub fn track_direction(&mut self, buttons: &ButtonState) {
        if let Some(direction) = buttons.direction() {
            self.last_direction = direction;
        }
    }

    /// Direct shift on a fresh press, then autoshift (DAS).
    ///
    /// The charge keeps building while no piece is in play so a held direction
    /// carries over into the next piece.
    pub fn update_shift(
        &mut self,
        grid: &Grid,
        buttons: &ButtonState,
        rules: &Rules,
        effects: &mut Effects,
    ) {
        let direction = buttons.direction();
        if direction != self.autoshift_direction {
            self.autoshift_direction = direction;
            self.autoshift_charge = 0;
            self.autoshift_delay = 0;
        }
        let Some(direction) = direction else {
            return;
        };

        if buttons.fresh_direction() == Some(direction) {
            self.autoshift_charge = 0;
            self.autoshift_delay = 0;
            if self.shift(grid, direction) {
                emit(effects, Effect::Slide { direction });
            }
            return;
        }

        if self.autoshift_charge < rules.das_charge {
            self.autoshift_charge += 1;
        }
        if self.autoshift_charge >= rules.das_charge && self.state.has_piece() {
            self.autoshift_delay += 1;
            if self.autoshift_delay >= rules.das_repeat.max(1) {
                self.autoshift_delay = 0;
                if self.shift(grid, direction) {
                    emit(effects, Effect::Slide { direction });
                }
            }
        }
    }

    /// Turn the piece. The kick preference follows the last horizontal direction.
    pub fn rotate(&mut self, grid: &Grid, turn: Turn) -> RotateOutcome {
        if !self.state.has_piece() {
            return RotateOutcome::Blocked;
        }
        let ctx = KickContext {
            spawn_frame: self.state == PlayerState::Spawned,
            preference: self.last_direction,
        };
        match try_rotate(grid, self.piece, self.spin, self.position, turn, ctx) {
            Some(rotated) => {
                self.spin = rotated.spin;
                self.position = rotated.pos;
                self.note_descent();
                match rotated.kick {
                    Some(kick) => RotateOutcome::Kicked(kick),
                    None => RotateOutcome::Rotated,
                }
            }
            None => RotateOutcome::Blocked,
        }
    }

    /// Reaching a new lowest row halves the lock delay
    fn note_descent(&mut self) {
        if self.position.1 < self.y_lowest {
            self.y_lowest = self.position.1;
            self.lock_delay /= 2;
        }
    }

    pub fn can_drop(&self, grid: &Grid) -> bool {
        let below = (self.position.0, self.position.1 - 1);
        !grid.overlaps(below, &self.shape())
    }

    /// Add `rate` to the accumulator and fall one row per whole unit.
    ///
    /// Landing zeroes the accumulator. Returns the number of rows fallen.
    pub fn apply_gravity(&mut self, grid: &Grid, rate: u32, soft_drop: bool) -> u32 {
        if !self.state.has_piece() {
            return 0;
        }
        self.y_sub = self.y_sub.saturating_add(rate);

        let mut dropped = 0;
        while self.y_sub >= SUBGRID_UNIT {
            if !self.can_drop(grid) {
                self.y_sub = 0;
                break;
            }
            self.position.1 -= 1;
            self.y_sub -= SUBGRID_UNIT;
            self.lock_delay = 0;
            self.note_descent();
            dropped += 1;
            if soft_drop {
                self.drop_bonus += 1;
            }
        }
        dropped
    }

    /// Count a grounded tick and lock when the delay runs out or HardDrop is held.
    ///
    /// Returns true if the piece locked.
    pub fn update_lock(
        &mut self,
        grid: &mut Grid,
        rules: &Rules,
        hard_drop: bool,
        effects: &mut Effects,
    ) -> bool {
        if !self.state.has_piece() || self.can_drop(grid) {
            return false;
        }
        self.lock_delay += 1;
        if self.lock_delay > rules.lock_delay || hard_drop {
            self.lock(grid, effects);
            return true;
        }
        false
    }

    fn lock(&mut self, grid: &mut Grid, effects: &mut Effects) {
        let cells = self.cells();
        grid.stamp(self.position, &self.shape(), self.piece);
        emit(
            effects,
            Effect::LockFlash {
                piece: self.piece,
                cells,
            },
        );

        self.cleared_rows = grid.full_rows();
        for &row in &self.cleared_rows {
            emit(effects, Effect::LineClear { row });
        }
        trace!(
            "locked {:?} at {:?}, {} full rows",
            self.piece,
            self.position,
            self.cleared_rows.len()
        );

        self.clear_delay = 0;
        self.spawn_delay = 0;
        self.state = if self.cleared_rows.is_empty() {
            PlayerState::Spawn
        } else {
            PlayerState::Clear
        };
    }

    /// Count down the clear delay, then collapse the marked rows top-down.
    ///
    /// Returns the number of rows removed this tick.
    pub fn update_clear(&mut self, grid: &mut Grid, rules: &Rules, effects: &mut Effects) -> u32 {
        if self.state != PlayerState::Clear {
            return 0;
        }
        self.clear_delay += 1;
        if self.clear_delay < rules.clear_delay {
            return 0;
        }

        // Descending order keeps the lower marked indices valid.
        for &row in self.cleared_rows.iter().rev() {
            grid.clear_row(row);
            grid.drop_row(row);
            emit(effects, Effect::Thump { row });
        }
        let count = self.cleared_rows.len() as u32;
        trace!("collapsed {count} rows");
        self.cleared_rows.clear();
        self.spawn_delay = 0;
        self.state = PlayerState::Spawn;
        count
    }

    /// Count down ARE. Returns true when the next piece should spawn.
    pub fn update_spawn_delay(&mut self, rules: &Rules, buttons: &ButtonState) -> bool {
        match self.state {
            PlayerState::None => true,
            PlayerState::Spawn => {
                self.spawn_delay += 1;
                self.spawn_delay >= rules.spawn_delay || buttons.any_fresh_spawn_trigger()
            }
            _ => false,
        }
    }

    /// Row the piece would land on if dropped straight down
    pub fn ghost_y(&self, grid: &Grid) -> Option<i8> {
        if !self.state.has_piece() {
            return None;
        }
        let shape = self.shape();
        let (x, mut y) = self.position;
        while !grid.overlaps((x, y - 1), &shape) {
            y -= 1;
        }
        Some(y)
    }
}
