//! Domain types with enforced invariants.
//!
//! - Side: MAX (+1) or MIN (-1)
//! - StateId: 1-based handle into a game tree's node table
//! - FlipRate: per-side flip probabilities with MAX's rate <= MIN's rate

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{PathologyError, Result};

/// The player to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Max,
    Min,
}

impl Side {
    /// +1 for MAX, -1 for MIN.
    pub fn sign(self) -> i8 {
        match self {
            Side::Max => 1,
            Side::Min => -1,
        }
    }

    /// Get the opposing side.
    pub fn opposite(self) -> Self {
        match self {
            Side::Max => Side::Min,
            Side::Min => Side::Max,
        }
    }

    /// Returns true if `a` is strictly better than `b` for this side.
    pub fn prefers(self, a: f64, b: f64) -> bool {
        match self {
            Side::Max => a > b,
            Side::Min => a < b,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Max => write!(f, "MAX"),
            Side::Min => write!(f, "MIN"),
        }
    }
}

/// Handle of a node in a game tree.
///
/// Ids are assigned incrementally from 1 (the root) and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateId(u32);

impl StateId {
    /// The root node is always state 1.
    pub const ROOT: StateId = StateId(1);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Zero-based position in a node table, `None` for the invalid id 0.
    pub fn index(self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }

    /// The id stored at zero-based position `index`.
    pub fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Probability that a non-optimal move at a choice node flips the minimax
/// value, one rate per side to move.
///
/// Invariant: both rates are in [0, 1] and `max <= min`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlipRate {
    max: f64,
    min: f64,
}

impl FlipRate {
    /// Fully adversarial setting: every non-optimal move flips.
    pub const ADVERSARIAL: FlipRate = FlipRate { max: 1.0, min: 1.0 };

    /// Create a flip-rate pair `(MAX's rate, MIN's rate)`.
    ///
    /// # Errors
    /// Returns `PathologyError::InvalidConfig` if a rate is outside [0, 1]
    /// or MAX's rate exceeds MIN's.
    pub fn new(max: f64, min: f64) -> Result<Self> {
        for rate in [max, min] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(PathologyError::InvalidConfig(format!(
                    "flip rate {} is outside [0, 1]",
                    rate
                )));
            }
        }
        if max > min {
            return Err(PathologyError::InvalidConfig(format!(
                "MAX flip rate {} exceeds MIN flip rate {}",
                max, min
            )));
        }
        Ok(Self { max, min })
    }

    /// Rate applied when `side` is to move.
    pub fn for_side(self, side: Side) -> f64 {
        match side {
            Side::Max => self.max,
            Side::Min => self.min,
        }
    }

    pub fn max_rate(self) -> f64 {
        self.max
    }

    pub fn min_rate(self) -> f64 {
        self.min
    }

    pub fn is_adversarial(self) -> bool {
        self == Self::ADVERSARIAL
    }
}

impl Default for FlipRate {
    fn default() -> Self {
        Self::ADVERSARIAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_sign_and_opposite() {
        assert_eq!(Side::Max.sign(), 1);
        assert_eq!(Side::Min.sign(), -1);
        assert_eq!(Side::Max.opposite(), Side::Min);
        assert_eq!(Side::Min.opposite().opposite(), Side::Min);
    }

    #[test]
    fn test_side_prefers() {
        assert!(Side::Max.prefers(0.8, 0.2));
        assert!(!Side::Max.prefers(0.2, 0.2));
        assert!(Side::Min.prefers(0.2, 0.8));
    }

    #[test]
    fn test_state_id_index() {
        assert_eq!(StateId::ROOT.index(), Some(0));
        assert_eq!(StateId::new(0).index(), None);
        assert_eq!(StateId::from_index(4), StateId::new(5));
    }

    #[test]
    fn test_flip_rate_valid() {
        let rate = FlipRate::new(0.2, 0.6).unwrap();
        assert_eq!(rate.for_side(Side::Max), 0.2);
        assert_eq!(rate.for_side(Side::Min), 0.6);
        assert!(!rate.is_adversarial());
        assert!(FlipRate::new(1.0, 1.0).unwrap().is_adversarial());
    }

    #[test]
    fn test_flip_rate_ordering() {
        assert!(FlipRate::new(0.7, 0.3).is_err());
    }

    #[test]
    fn test_flip_rate_range() {
        assert!(FlipRate::new(-0.1, 0.5).is_err());
        assert!(FlipRate::new(0.5, 1.5).is_err());
        assert!(FlipRate::new(f64::NAN, 1.0).is_err());
    }
}
