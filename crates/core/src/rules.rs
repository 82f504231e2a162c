//! Rules module - every tunable of a round in one serializable value
//!
//! A [`Rules`] value fully describes the timing of a round. Together with a seed
//! and an input stream it determines the round exactly, which is why replays
//! carry it verbatim.
//!
//! Missing fields fall back to the defaults from `tetrion_types`, so a replay or
//! config file only has to spell out what it changes:
//!
//! ```
//! use tetrion_core::rules::{Mode, Rules};
//!
//! let rules: Rules = serde_json::from_str(r#"{ "mode": { "sprint": { "lines": 40 } } }"#).unwrap();
//! assert_eq!(rules.mode, Mode::Sprint { lines: 40 });
//! assert_eq!(rules.lock_delay, Rules::default().lock_delay);
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{
    CLEAR_DELAY_TICKS, DAS_CHARGE_TICKS, DAS_REPEAT_TICKS, DEFAULT_GRAVITY, GRAVITY_CAP,
    GRAVITY_INCREMENT, LOCK_DELAY_TICKS, MAX_GRAVITY, SOFT_DROP_GRAVITY, SPAWN_DELAY_TICKS,
    STARTING_TOKENS,
};

/// Gravity parameters, all in subgrid units per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityRules {
    /// Gravity at round start
    pub initial: u32,
    /// Added on every spawn
    pub increment: u32,
    /// Upper bound for the spawn ramp
    pub cap: u32,
    /// Lower bound while SoftDrop is held
    pub soft_drop: u32,
    /// Rate while HardDrop is held
    pub max: u32,
}

impl Default for GravityRules {
    fn default() -> Self {
        Self {
            initial: DEFAULT_GRAVITY,
            increment: GRAVITY_INCREMENT,
            cap: GRAVITY_CAP,
            soft_drop: SOFT_DROP_GRAVITY,
            max: MAX_GRAVITY,
        }
    }
}

impl GravityRules {
    /// Gravity after one more spawn
    pub fn ramp(&self, current: u32) -> u32 {
        current.saturating_add(self.increment).min(self.cap.max(current))
    }

    /// Per-tick rate for the given held drop buttons
    pub fn rate(&self, current: u32, soft_drop: bool, hard_drop: bool) -> u32 {
        if hard_drop {
            self.max
        } else if soft_drop {
            current.max(self.soft_drop)
        } else {
            current
        }
    }
}

/// Which pieces the very first draw of a round may produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstPiecePolicy {
    /// Any piece
    #[default]
    Any,
    /// Never S, Z or O, which cannot be placed flat on an empty field without a hole
    AvoidSzo,
}

/// Round goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Endless; the round only ends by topping out
    #[default]
    Marathon,
    /// Completes once this many lines are cleared
    Sprint { lines: u32 },
    /// Ends when the tick counter reaches `ticks`
    TimeLimit { ticks: u64 },
}

/// Round configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub gravity: GravityRules,
    /// Grounded ticks tolerated before the piece locks
    pub lock_delay: u32,
    pub clear_delay: u32,
    /// ARE
    pub spawn_delay: u32,
    /// Ticks a direction must be held before autoshift starts
    pub das_charge: u32,
    /// Ticks between autoshift repeats
    pub das_repeat: u32,
    /// Tokens every type starts with. Values below 1 are raised to 1.
    pub starting_tokens: i32,
    pub first_piece: FirstPiecePolicy,
    pub mode: Mode,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            gravity: GravityRules::default(),
            lock_delay: LOCK_DELAY_TICKS,
            clear_delay: CLEAR_DELAY_TICKS,
            spawn_delay: SPAWN_DELAY_TICKS,
            das_charge: DAS_CHARGE_TICKS,
            das_repeat: DAS_REPEAT_TICKS,
            starting_tokens: STARTING_TOKENS,
            first_piece: FirstPiecePolicy::default(),
            mode: Mode::default(),
        }
    }
}

impl Rules {
    /// Rules with a fixed gravity that never ramps
    pub fn with_constant_gravity(mut self, gravity: u32) -> Self {
        self.gravity.initial = gravity;
        self.gravity.increment = 0;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_stops_at_cap() {
        let gravity = GravityRules {
            increment: 100,
            cap: 250,
            ..GravityRules::default()
        };
        assert_eq!(gravity.ramp(100), 200);
        assert_eq!(gravity.ramp(200), 250);
        assert_eq!(gravity.ramp(250), 250);
    }

    #[test]
    fn test_ramp_never_lowers_gravity_above_cap() {
        let gravity = GravityRules {
            initial: 600,
            cap: 300,
            ..GravityRules::default()
        };
        assert_eq!(gravity.ramp(600), 600);
    }

    #[test]
    fn test_rate_selection() {
        let gravity = GravityRules::default();
        assert_eq!(gravity.rate(4, false, false), 4);
        assert_eq!(gravity.rate(4, true, false), SOFT_DROP_GRAVITY);
        assert_eq!(gravity.rate(1000, true, false), 1000);
        assert_eq!(gravity.rate(4, true, true), MAX_GRAVITY);
    }

    #[test]
    fn test_rules_json_roundtrip() {
        let rules = Rules::default()
            .with_constant_gravity(0)
            .with_mode(Mode::TimeLimit { ticks: 3600 });
        let json = serde_json::to_string(&rules).unwrap();
        let back: Rules = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rules);
    }

    #[test]
    fn test_empty_json_is_default() {
        let rules: Rules = serde_json::from_str("{}").unwrap();
        assert_eq!(rules, Rules::default());
    }
}
