//! Core types module - shared data structures and constants
//!
//! This crate defines the plain data vocabulary shared by the simulation core, the
//! replay format and any presentation layer. Everything here is `Copy` data with
//! serde support; no game rules live in this crate.
//!
//! # Field Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9, left to right)
//! - **Height**: 20 rows (indexed 0-19, **bottom to top**)
//! - **Spawn position**: (3, 18), the lower-left corner of the piece's bounding box
//!
//! Rows above the field (`y >= GRID_HEIGHT`) are open air: pieces may rise into
//! them but nothing is ever stored there.
//!
//! # Timing Constants
//!
//! All timing is counted in simulation ticks (nominally 60 per second). Gravity is
//! fixed-point: a piece falls one row each time its accumulator passes
//! [`SUBGRID_UNIT`].
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `SUBGRID_UNIT` | 256 | Gravity units per row (1G = 256) |
//! | `DEFAULT_GRAVITY` | 4 | Starting gravity (1/64 G) |
//! | `GRAVITY_INCREMENT` | 1 | Gravity added on every spawn |
//! | `GRAVITY_CAP` | 5120 | Gravity ceiling (20G) |
//! | `SOFT_DROP_GRAVITY` | 256 | Soft drop floor (1G) |
//! | `LOCK_DELAY_TICKS` | 30 | Grounded ticks before a forced lock |
//! | `CLEAR_DELAY_TICKS` | 40 | Pause between lock and row collapse |
//! | `SPAWN_DELAY_TICKS` | 25 | ARE, lock-to-spawn delay |
//! | `DAS_CHARGE_TICKS` | 16 | Hold time before autoshift starts |
//! | `DAS_REPEAT_TICKS` | 1 | Ticks between autoshift repeats |
//!
//! # Examples
//!
//! ```
//! use tetrion_types::{Button, InputFrame, Mino, PieceType, Spin, GRID_HEIGHT, GRID_WIDTH};
//!
//! let piece = PieceType::from_str("t").unwrap();
//! assert_eq!(Mino::from(piece), Mino::T);
//!
//! assert_eq!(Spin::R0.cw(), Spin::R90);
//! assert_eq!(Spin::R0.ccw(), Spin::R270);
//!
//! let mut frame = InputFrame::new();
//! assert!(frame.press(Button::Left));
//! assert!(frame.is_pressed(Button::Left));
//!
//! assert_eq!(GRID_WIDTH, 10);
//! assert_eq!(GRID_HEIGHT, 20);
//! ```

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// Field width in cells (10 columns)
pub const GRID_WIDTH: u8 = 10;

/// Field height in cells (20 rows)
pub const GRID_HEIGHT: u8 = 20;

/// Spawn column of the piece's bounding-box corner
pub const SPAWN_X: i8 = 3;

/// Spawn row of the piece's bounding-box corner
pub const SPAWN_Y: i8 = GRID_HEIGHT as i8 - 2;

/// Number of distinct piece types
pub const PIECE_TYPE_COUNT: usize = 7;

/// Nominal tick rate; the simulation itself never reads a clock.
pub const TICKS_PER_SECOND: u32 = 60;

/// Fixed-point gravity units per row
pub const SUBGRID_UNIT: u32 = 256;

/// Starting gravity in subgrid units per tick
pub const DEFAULT_GRAVITY: u32 = 4;

/// Gravity added each time a piece spawns
pub const GRAVITY_INCREMENT: u32 = 1;

/// Gravity ceiling (20G)
pub const GRAVITY_CAP: u32 = 20 * SUBGRID_UNIT;

/// Minimum gravity while soft drop is held (1G)
pub const SOFT_DROP_GRAVITY: u32 = SUBGRID_UNIT;

/// Gravity while hard drop is held; enough to cross the whole field in one tick
pub const MAX_GRAVITY: u32 = GRID_HEIGHT as u32 * SUBGRID_UNIT;

/// Grounded ticks tolerated before the piece locks
pub const LOCK_DELAY_TICKS: u32 = 30;

/// Ticks between a line-clearing lock and the row collapse
pub const CLEAR_DELAY_TICKS: u32 = 40;

/// Ticks between a lock (or collapse) and the next spawn (ARE)
pub const SPAWN_DELAY_TICKS: u32 = 25;

/// Ticks a direction must be held before autoshift starts
pub const DAS_CHARGE_TICKS: u32 = 16;

/// Ticks between autoshift repeats once charged
pub const DAS_REPEAT_TICKS: u32 = 1;

/// Initial randomizer tokens per piece type
pub const STARTING_TOKENS: i32 = 5;

/// Content of a single grid cell
///
/// - **Empty**: open cell
/// - **I..S**: cell left behind by a locked piece of that type
/// - **Garbage**: permanently solid cell that belongs to no piece; also what the
///   walls and floor read as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mino {
    #[default]
    Empty,
    I,
    L,
    O,
    Z,
    T,
    J,
    S,
    Garbage,
}

impl Mino {
    pub fn is_empty(&self) -> bool {
        matches!(self, Mino::Empty)
    }

    /// Stable byte code (0 = empty, 1-7 = piece cells, 8 = garbage)
    pub fn as_u8(&self) -> u8 {
        match self {
            Mino::Empty => 0,
            Mino::I => 1,
            Mino::L => 2,
            Mino::O => 3,
            Mino::Z => 4,
            Mino::T => 5,
            Mino::J => 6,
            Mino::S => 7,
            Mino::Garbage => 8,
        }
    }

    /// Single-character glyph used by text dumps
    pub fn as_char(&self) -> char {
        match self {
            Mino::Empty => '.',
            Mino::I => 'I',
            Mino::L => 'L',
            Mino::O => 'O',
            Mino::Z => 'Z',
            Mino::T => 'T',
            Mino::J => 'J',
            Mino::S => 'S',
            Mino::Garbage => '#',
        }
    }
}

impl From<PieceType> for Mino {
    fn from(value: PieceType) -> Self {
        match value {
            PieceType::I => Mino::I,
            PieceType::L => Mino::L,
            PieceType::O => Mino::O,
            PieceType::Z => Mino::Z,
            PieceType::T => Mino::T,
            PieceType::J => Mino::J,
            PieceType::S => Mino::S,
        }
    }
}

/// The seven tetromino shapes
///
/// The declaration order is also the randomizer's token order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    I,
    L,
    O,
    Z,
    T,
    J,
    S,
}

impl PieceType {
    pub const ALL: [PieceType; PIECE_TYPE_COUNT] = [
        PieceType::I,
        PieceType::L,
        PieceType::O,
        PieceType::Z,
        PieceType::T,
        PieceType::J,
        PieceType::S,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Parse piece type from string (case-insensitive)
    ///
    /// ```
    /// use tetrion_types::PieceType;
    ///
    /// assert_eq!(PieceType::from_str("i"), Some(PieceType::I));
    /// assert_eq!(PieceType::from_str("Z"), Some(PieceType::Z));
    /// assert_eq!(PieceType::from_str("x"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "i" => Some(PieceType::I),
            "l" => Some(PieceType::L),
            "o" => Some(PieceType::O),
            "z" => Some(PieceType::Z),
            "t" => Some(PieceType::T),
            "j" => Some(PieceType::J),
            "s" => Some(PieceType::S),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceType::I => "i",
            PieceType::L => "l",
            PieceType::O => "o",
            PieceType::Z => "z",
            PieceType::T => "t",
            PieceType::J => "j",
            PieceType::S => "s",
        }
    }
}

/// Rotation state, cyclic: R0 → R90 → R180 → R270 → R0 (clockwise)
///
/// R0 is the spawn orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Spin {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Spin {
    pub const ALL: [Spin; 4] = [Spin::R0, Spin::R90, Spin::R180, Spin::R270];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    pub fn cw(&self) -> Self {
        self.turned(Turn::Cw)
    }

    pub fn ccw(&self) -> Self {
        self.turned(Turn::Ccw)
    }

    pub fn turned(&self, turn: Turn) -> Self {
        match turn {
            Turn::Cw => Self::from_index(self.index() + 1),
            Turn::Ccw => Self::from_index(self.index() + 3),
        }
    }

    /// Whether the spin stands a three-tall piece on end
    pub fn is_vertical(&self) -> bool {
        matches!(self, Spin::R90 | Spin::R270)
    }
}

/// Rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Turn {
    Cw,
    Ccw,
}

/// Horizontal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn dx(&self) -> i8 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn button(&self) -> Button {
        match self {
            Direction::Left => Button::Left,
            Direction::Right => Button::Right,
        }
    }
}

/// Abstract buttons the simulation understands
///
/// `RotCcw2` is a second counter-clockwise button. `HardDrop` doubles as the
/// lock button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Left,
    Right,
    RotCw,
    RotCcw,
    RotCcw2,
    SoftDrop,
    HardDrop,
}

impl Button {
    pub const COUNT: usize = 7;

    pub const ALL: [Button; Button::COUNT] = [
        Button::Left,
        Button::Right,
        Button::RotCw,
        Button::RotCcw,
        Button::RotCcw2,
        Button::SoftDrop,
        Button::HardDrop,
    ];

    /// Bit of this button in a packed button set
    pub fn bit(&self) -> u8 {
        1 << (*self as u8)
    }

    /// Rotation performed by this button, if it is a rotation button
    pub fn turn(&self) -> Option<Turn> {
        match self {
            Button::RotCw => Some(Turn::Cw),
            Button::RotCcw | Button::RotCcw2 => Some(Turn::Ccw),
            _ => None,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            Button::Left => Some(Direction::Left),
            Button::Right => Some(Direction::Right),
            _ => None,
        }
    }

    /// Parse button from string (case-insensitive)
    ///
    /// ```
    /// use tetrion_types::Button;
    ///
    /// assert_eq!(Button::from_str("rotCcw2"), Some(Button::RotCcw2));
    /// assert_eq!(Button::from_str("HARDDROP"), Some(Button::HardDrop));
    /// assert_eq!(Button::from_str("hold"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Some(Button::Left),
            "right" => Some(Button::Right),
            "rotcw" => Some(Button::RotCw),
            "rotccw" => Some(Button::RotCcw),
            "rotccw2" => Some(Button::RotCcw2),
            "softdrop" => Some(Button::SoftDrop),
            "harddrop" => Some(Button::HardDrop),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Button::Left => "left",
            Button::Right => "right",
            Button::RotCw => "rotCw",
            Button::RotCcw => "rotCcw",
            Button::RotCcw2 => "rotCcw2",
            Button::SoftDrop => "softDrop",
            Button::HardDrop => "hardDrop",
        }
    }
}

/// Button edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Pressed,
    Released,
}

/// A single button transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ButtonEvent {
    pub button: Button,
    pub edge: Edge,
}

impl ButtonEvent {
    pub fn press(button: Button) -> Self {
        Self {
            button,
            edge: Edge::Pressed,
        }
    }

    pub fn release(button: Button) -> Self {
        Self {
            button,
            edge: Edge::Released,
        }
    }
}

/// One tick's worth of button edges, in the order they happened.
///
/// The input mapper coalesces edges so that each button appears at most once per
/// tick, which bounds the frame at [`Button::COUNT`] events and keeps it on the
/// stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputFrame {
    events: ArrayVec<ButtonEvent, { Button::COUNT }>,
}

impl InputFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame from events; extra events past capacity are dropped.
    pub fn from_events(events: &[ButtonEvent]) -> Self {
        let mut frame = Self::new();
        for &event in events {
            frame.push(event);
        }
        frame
    }

    /// Append an event. Returns false if the frame is full.
    pub fn push(&mut self, event: ButtonEvent) -> bool {
        self.events.try_push(event).is_ok()
    }

    pub fn press(&mut self, button: Button) -> bool {
        self.push(ButtonEvent::press(button))
    }

    pub fn release(&mut self, button: Button) -> bool {
        self.push(ButtonEvent::release(button))
    }

    pub fn events(&self) -> &[ButtonEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.events
            .iter()
            .any(|e| e.button == button && e.edge == Edge::Pressed)
    }

    pub fn is_released(&self, button: Button) -> bool {
        self.events
            .iter()
            .any(|e| e.button == button && e.edge == Edge::Released)
    }
}

/// State tag of the player's piece state machine
///
/// `None → Spawned → Active → (Clear →) Spawn → Spawned → …`, with `GameOver`
/// reachable from `Spawned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerState {
    /// Round created, first piece not yet spawned
    #[default]
    None,
    /// Piece appeared this tick (IRS window)
    Spawned,
    /// Piece under player control
    Active,
    /// Waiting for marked rows to collapse
    Clear,
    /// Waiting out the spawn delay (ARE)
    Spawn,
    /// Spawned piece overlapped the stack
    GameOver,
}

impl PlayerState {
    /// Whether a piece is on the field
    pub fn has_piece(&self) -> bool {
        matches!(self, PlayerState::Spawned | PlayerState::Active)
    }
}

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// A new piece overlapped the stack
    ToppedOut,
    /// The mode's goal was reached
    Completed,
    /// The mode's deadline passed
    TimeUp,
}

/// Cosmetic event for the presentation layer.
///
/// Produced fresh by every tick; the core never reads them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// A piece was stamped into the grid at these absolute cells
    LockFlash {
        piece: PieceType,
        cells: [(i8, i8); 4],
    },
    /// A full row was marked for clearing
    LineClear { row: i8 },
    /// A marked row was removed and the stack above it fell
    Thump { row: i8 },
    /// The piece moved one column
    Slide { direction: Direction },
}
