use serde::Serialize;

use crate::types::{
    Direction, Mino, Outcome, PieceType, PlayerState, Spin, GRID_HEIGHT, GRID_WIDTH,
    PIECE_TYPE_COUNT,
};

/// Stable 64-bit FNV-1a hasher for deterministic `state_hash`.
///
/// We avoid `DefaultHasher` here since its output is not guaranteed stable across
/// Rust versions/platforms.
#[derive(Debug, Clone)]
pub struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for Fnv1aHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::hash::Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PieceSnapshot {
    pub piece: PieceType,
    pub spin: Spin,
    pub x: i8,
    pub y: i8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TimersSnapshot {
    pub y_sub: u32,
    pub lock_delay: u32,
    pub clear_delay: u32,
    pub spawn_delay: u32,
    pub autoshift_charge: u32,
}

/// State nothing draws but every future tick depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HiddenSnapshot {
    pub tokens: [i32; PIECE_TYPE_COUNT],
    pub rng_state: u32,
    pub y_lowest: i8,
    pub last_direction: Direction,
    pub autoshift_direction: Option<Direction>,
    pub autoshift_delay: u32,
    pub drop_bonus: u32,
    pub held_buttons: u8,
}

impl Default for HiddenSnapshot {
    fn default() -> Self {
        Self {
            tokens: [0; PIECE_TYPE_COUNT],
            rng_state: 0,
            y_lowest: 0,
            last_direction: Direction::Right,
            autoshift_direction: None,
            autoshift_delay: 0,
            drop_bonus: 0,
            held_buttons: 0,
        }
    }
}

fn direction_byte(direction: Option<Direction>) -> u8 {
    match direction {
        None => 0,
        Some(Direction::Left) => 1,
        Some(Direction::Right) => 2,
    }
}

/// Plain-data copy of everything a presentation layer draws, plus the hidden
/// state needed to tell two rounds apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GameSnapshot {
    /// Row 0 first
    pub grid: [[Mino; GRID_WIDTH as usize]; GRID_HEIGHT as usize],
    pub state: PlayerState,
    pub active: Option<PieceSnapshot>,
    pub ghost_y: Option<i8>,
    pub preview: PieceType,
    pub gravity: u32,
    pub tick: u64,
    pub lines: u32,
    pub pieces: u32,
    pub outcome: Option<Outcome>,
    pub timers: TimersSnapshot,
    pub hidden: HiddenSnapshot,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.grid = [[Mino::Empty; GRID_WIDTH as usize]; GRID_HEIGHT as usize];
        self.state = PlayerState::None;
        self.active = None;
        self.ghost_y = None;
        self.preview = PieceType::I;
        self.gravity = 0;
        self.tick = 0;
        self.lines = 0;
        self.pieces = 0;
        self.outcome = None;
        self.timers = TimersSnapshot::default();
        self.hidden = HiddenSnapshot::default();
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// FNV-1a digest of the whole snapshot.
    ///
    /// Fields are written as fixed-width little-endian bytes so the digest is the
    /// same on every platform, which makes it usable in replay files.
    pub fn state_hash(&self) -> u64 {
        use std::hash::Hasher;

        let mut h = Fnv1aHasher::new();
        for row in &self.grid {
            for cell in row {
                h.write_u8(cell.as_u8());
            }
        }
        h.write_u8(self.state as u8);
        match self.active {
            Some(active) => {
                h.write_u8(1);
                h.write_u8(active.piece.index() as u8);
                h.write_u8(active.spin.index() as u8);
                h.write(&active.x.to_le_bytes());
                h.write(&active.y.to_le_bytes());
            }
            None => h.write_u8(0),
        }
        h.write(&self.ghost_y.unwrap_or(i8::MIN).to_le_bytes());
        h.write_u8(self.preview.index() as u8);
        h.write(&self.gravity.to_le_bytes());
        h.write(&self.tick.to_le_bytes());
        h.write(&self.lines.to_le_bytes());
        h.write(&self.pieces.to_le_bytes());
        h.write_u8(self.outcome.map_or(0, |o| o as u8 + 1));
        for timer in [
            self.timers.y_sub,
            self.timers.lock_delay,
            self.timers.clear_delay,
            self.timers.spawn_delay,
            self.timers.autoshift_charge,
        ] {
            h.write(&timer.to_le_bytes());
        }

        let hidden = &self.hidden;
        for token in hidden.tokens {
            h.write(&token.to_le_bytes());
        }
        h.write(&hidden.rng_state.to_le_bytes());
        h.write(&hidden.y_lowest.to_le_bytes());
        h.write_u8(direction_byte(Some(hidden.last_direction)));
        h.write_u8(direction_byte(hidden.autoshift_direction));
        h.write(&hidden.autoshift_delay.to_le_bytes());
        h.write(&hidden.drop_bonus.to_le_bytes());
        h.write_u8(hidden.held_buttons);
        h.finish()
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        let mut s = Self {
            grid: [[Mino::Empty; GRID_WIDTH as usize]; GRID_HEIGHT as usize],
            state: PlayerState::None,
            active: None,
            ghost_y: None,
            preview: PieceType::I,
            gravity: 0,
            tick: 0,
            lines: 0,
            pieces: 0,
            outcome: None,
            timers: TimersSnapshot::default(),
            hidden: HiddenSnapshot::default(),
        };
        s.clear();
        s
    }
}
