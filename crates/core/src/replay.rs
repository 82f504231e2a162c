//! Replay module - a round as seed, rules and input stream
//!
//! Because the core is deterministic, these three values reproduce a round tick
//! for tick. A replay may also carry the state hash of its final snapshot, which
//! lets a reader check that the build replaying it agrees with the build that
//! recorded it.
//!
//! Storage and compression belong to the caller; the type is plain serde data.

use serde::{Deserialize, Serialize};

use crate::play_state::PlayState;
use crate::player::Effects;
use crate::rules::Rules;
use crate::types::InputFrame;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    pub seed: u32,
    #[serde(default)]
    pub rules: Rules,
    /// One entry per tick
    #[serde(default)]
    pub frames: Vec<InputFrame>,
    /// `GameSnapshot::state_hash` after the last frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_hash: Option<u64>,
}

impl Replay {
    pub fn new(seed: u32, rules: Rules) -> Self {
        Self {
            seed,
            rules,
            frames: Vec::new(),
            final_hash: None,
        }
    }

    /// Fresh round for this replay's seed and rules
    pub fn start(&self) -> PlayState {
        PlayState::new(self.seed, self.rules)
    }

    /// Append one tick of input
    pub fn record(&mut self, frame: InputFrame) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Run every frame, calling `observe` after each tick.
    ///
    /// Stops early once the round has an outcome.
    pub fn play_with<F>(&self, mut observe: F) -> PlayState
    where
        F: FnMut(&PlayState, &Effects),
    {
        let mut play = self.start();
        for frame in &self.frames {
            if play.is_over() {
                break;
            }
            let effects = play.tick(frame);
            observe(&play, &effects);
        }
        play
    }

    pub fn play(&self) -> PlayState {
        self.play_with(|_, _| {})
    }

    /// Record the final state hash
    pub fn seal(&mut self) -> u64 {
        let hash = self.play().snapshot().state_hash();
        self.final_hash = Some(hash);
        hash
    }

    /// Replay and compare against the recorded hash.
    ///
    /// `None` when the replay carries no hash.
    pub fn verify(&self) -> Option<bool> {
        let expected = self.final_hash?;
        Some(self.play().snapshot().state_hash() == expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Button;

    fn sample() -> Replay {
        let mut replay = Replay::new(2024, Rules::default());
        for i in 0..120 {
            let mut frame = InputFrame::new();
            match i % 30 {
                1 => {
                    frame.press(Button::Left);
                }
                3 => {
                    frame.release(Button::Left);
                }
                5 => {
                    frame.press(Button::HardDrop);
                }
                6 => {
                    frame.release(Button::HardDrop);
                }
                _ => {}
            }
            replay.record(frame);
        }
        replay
    }

    #[test]
    fn test_seal_then_verify() {
        let mut replay = sample();
        assert_eq!(replay.verify(), None);
        replay.seal();
        assert_eq!(replay.verify(), Some(true));

        replay.frames.pop();
        assert_eq!(replay.verify(), Some(false));
    }

    #[test]
    fn test_json_roundtrip_replays_identically() {
        let mut replay = sample();
        let hash = replay.seal();

        let json = serde_json::to_string(&replay).unwrap();
        let back: Replay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, replay);
        assert_eq!(back.play().snapshot().state_hash(), hash);
    }

    #[test]
    fn test_minimal_json() {
        let replay: Replay = serde_json::from_str(r#"{ "seed": 9 }"#).unwrap();
        assert!(replay.is_empty());
        assert_eq!(replay.rules, Rules::default());
    }
}
