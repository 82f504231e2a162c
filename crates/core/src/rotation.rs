//! Rotation module - shape tables, crawl offsets and the kick search
//!
//! Shapes are stored normalized: for every (piece, spin) the lowest-leftmost corner
//! of the bounding box is at (0, 0) and the piece position names that corner. A
//! rotation therefore has two separate position corrections:
//!
//! 1. the **crawl offset**, applied unconditionally with the spin change, which keeps
//!    the piece turning around a fixed visual center despite the normalized storage;
//! 2. the **kick**, a legality repair searched only when the crawled position
//!    collides.
//!
//! L, J and T turn freely through four states. S, Z and I are two-state pieces:
//! their crawl tables bounce between the same two positions so they never wobble.
//! O never moves.

use crate::grid::Grid;
use crate::types::{Direction, PieceType, Spin, Turn, GRID_WIDTH};

/// Offset of a single mino relative to piece position, y up
pub type MinoOffset = (i8, i8);

/// Shape of a piece - 4 mino offsets from piece position
pub type PieceShape = [MinoOffset; 4];

const I_FLAT: PieceShape = [(0, 0), (1, 0), (2, 0), (3, 0)];
const I_TALL: PieceShape = [(0, 0), (0, 1), (0, 2), (0, 3)];
const O_SHAPE: PieceShape = [(0, 0), (1, 0), (0, 1), (1, 1)];
const S_FLAT: PieceShape = [(0, 0), (1, 0), (1, 1), (2, 1)];
const S_TALL: PieceShape = [(1, 0), (0, 1), (1, 1), (0, 2)];
const Z_FLAT: PieceShape = [(1, 0), (2, 0), (0, 1), (1, 1)];
const Z_TALL: PieceShape = [(0, 0), (0, 1), (1, 1), (1, 2)];

/// Shape table indexed by `[PieceType::index()][Spin::index()]`
#[rustfmt::skip]
static SHAPES: [[PieceShape; 4]; 7] = [
    // I
    [I_FLAT, I_TALL, I_FLAT, I_TALL],
    // L
    [
        [(0, 0), (1, 0), (2, 0), (2, 1)],
        [(0, 0), (1, 0), (0, 1), (0, 2)],
        [(0, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (0, 2), (1, 2)],
    ],
    // O
    [O_SHAPE, O_SHAPE, O_SHAPE, O_SHAPE],
    // Z
    [Z_FLAT, Z_TALL, Z_FLAT, Z_TALL],
    // T
    [
        [(0, 0), (1, 0), (2, 0), (1, 1)],
        [(0, 0), (0, 1), (1, 1), (0, 2)],
        [(1, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // J
    [
        [(0, 0), (1, 0), (2, 0), (0, 1)],
        [(0, 0), (0, 1), (0, 2), (1, 2)],
        [(2, 0), (0, 1), (1, 1), (2, 1)],
        [(0, 0), (1, 0), (1, 1), (1, 2)],
    ],
    // S
    [S_FLAT, S_TALL, S_FLAT, S_TALL],
];

/// Clockwise crawl offsets indexed by the spin being left.
///
/// Counter-clockwise from spin `s` is the negation of clockwise from `s - 1`, so
/// every CW/CCW pair cancels exactly.
type CrawlTable = [MinoOffset; 4];

const LJT_CRAWL: CrawlTable = [(1, -1), (-1, 0), (0, 0), (0, 1)];
const SZ_CRAWL: CrawlTable = [(1, -1), (-1, 1), (1, -1), (-1, 1)];
const I_CRAWL: CrawlTable = [(2, -2), (-2, 2), (2, -2), (-2, 2)];
const O_CRAWL: CrawlTable = [(0, 0); 4];

/// One kick candidate. `toward` is multiplied by the preferred direction's dx.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kick {
    pub toward: i8,
    pub dy: i8,
}

impl Kick {
    pub fn offset(&self, preference: Direction) -> MinoOffset {
        (self.toward * preference.dx(), self.dy)
    }
}

/// Candidate order: down, preferred side, up, other side, then the two
/// side-and-down floor kicks.
pub static STANDARD_KICKS: [Kick; 6] = [
    Kick { toward: 0, dy: -1 },
    Kick { toward: 1, dy: 0 },
    Kick { toward: 0, dy: 1 },
    Kick { toward: -1, dy: 0 },
    Kick { toward: 1, dy: -1 },
    Kick { toward: -1, dy: -1 },
];

/// Per-piece rotation capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KickProfile {
    /// Rotation either fits after crawling or fails
    pub never_kicks: bool,
    /// Center column (relative to piece position) per target spin. When every
    /// blocked cell sits in this column the search stops without kicking.
    pub center_column: [Option<i8>; 4],
    pub kicks: &'static [Kick],
}

static I_PROFILE: KickProfile = KickProfile {
    never_kicks: true,
    center_column: [None; 4],
    kicks: &STANDARD_KICKS,
};

static LJT_PROFILE: KickProfile = KickProfile {
    never_kicks: false,
    center_column: [None, Some(0), None, Some(1)],
    kicks: &STANDARD_KICKS,
};

static FREE_PROFILE: KickProfile = KickProfile {
    never_kicks: false,
    center_column: [None; 4],
    kicks: &STANDARD_KICKS,
};

/// Get the shape (mino offsets) for a piece type and spin
pub fn shape_of(piece: PieceType, spin: Spin) -> PieceShape {
    SHAPES[piece.index()][spin.index()]
}

fn crawl_table(piece: PieceType) -> &'static CrawlTable {
    match piece {
        PieceType::I => &I_CRAWL,
        PieceType::O => &O_CRAWL,
        PieceType::S | PieceType::Z => &SZ_CRAWL,
        PieceType::L | PieceType::J | PieceType::T => &LJT_CRAWL,
    }
}

/// Position correction applied when turning `piece` out of `from`
pub fn crawl_offset(piece: PieceType, from: Spin, turn: Turn) -> MinoOffset {
    let table = crawl_table(piece);
    match turn {
        Turn::Cw => table[from.index()],
        Turn::Ccw => {
            let (dx, dy) = table[from.ccw().index()];
            (-dx, -dy)
        }
    }
}

pub fn kick_profile(piece: PieceType) -> &'static KickProfile {
    match piece {
        PieceType::I => &I_PROFILE,
        PieceType::L | PieceType::J | PieceType::T => &LJT_PROFILE,
        PieceType::O | PieceType::S | PieceType::Z => &FREE_PROFILE,
    }
}

/// Inputs to the kick search that come from the player rather than the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KickContext {
    /// The piece spawned this tick; rotation here is IRS and never kicks
    pub spawn_frame: bool,
    /// Side tried first; follows the last horizontal direction pressed
    pub preference: Direction,
}

/// How a rotation resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateOutcome {
    /// Legal straight after the crawl offset
    Rotated,
    /// Legal after moving by the given kick
    Kicked(MinoOffset),
    /// No legal position; nothing changed
    Blocked,
}

/// Result of a successful rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotated {
    pub spin: Spin,
    pub pos: MinoOffset,
    /// `None` when the crawl alone was legal
    pub kick: Option<MinoOffset>,
}

/// Search for a legal position for `piece` at `spin`, starting from the already
/// crawled `pos`. Returns the offset to apply, `(0, 0)` if `pos` itself is legal.
pub fn try_kicks(
    grid: &Grid,
    piece: PieceType,
    spin: Spin,
    pos: MinoOffset,
    ctx: KickContext,
) -> Option<MinoOffset> {
    let shape = shape_of(piece, spin);
    if !grid.overlaps(pos, &shape) {
        return Some((0, 0));
    }

    let profile = kick_profile(piece);
    if profile.never_kicks || ctx.spawn_frame {
        return None;
    }

    // Only stack cells count here; walls and floor always fall through to kicks.
    if let Some(column) = profile.center_column[spin.index()] {
        let center_only = shape
            .iter()
            .map(|&(dx, dy)| (dx, pos.0 + dx, pos.1 + dy))
            .filter(|&(_, x, y)| !grid.get(x, y).is_empty())
            .all(|(dx, x, y)| dx == column && y >= 0 && (0..GRID_WIDTH as i8).contains(&x));
        if center_only {
            return None;
        }
    }

    profile
        .kicks
        .iter()
        .map(|kick| kick.offset(ctx.preference))
        .find(|&(kx, ky)| !grid.overlaps((pos.0 + kx, pos.1 + ky), &shape))
}

/// Turn a piece: spin change, crawl offset, then the kick search.
///
/// Returns `None` if every candidate collides; the caller keeps its original spin
/// and position.
pub fn try_rotate(
    grid: &Grid,
    piece: PieceType,
    spin: Spin,
    pos: MinoOffset,
    turn: Turn,
    ctx: KickContext,
) -> Option<Rotated> {
    let new_spin = spin.turned(turn);
    let (cx, cy) = crawl_offset(piece, spin, turn);
    let crawled = (pos.0 + cx, pos.1 + cy);

    let (kx, ky) = try_kicks(grid, piece, new_spin, crawled, ctx)?;
    Some(Rotated {
        spin: new_spin,
        pos: (crawled.0 + kx, crawled.1 + ky),
        kick: if (kx, ky) == (0, 0) { None } else { Some((kx, ky)) },
    })
}
