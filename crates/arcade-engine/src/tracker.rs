//! Level and score bookkeeping.

use serde::{Deserialize, Serialize};

/// Result of [`ScoreLevelTracker::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advance {
    /// More levels remain; `level` is the level now being played.
    LevelComplete {
        /// New current level.
        level: u32,
        /// Score so far.
        score: u32,
    },
    /// The last level was cleared.
    GameComplete {
        /// Cumulative score.
        final_score: u32,
    },
}

/// Tracks `(level, max_levels, score)` for one session.
///
/// Score and level only ever grow. The tracker does not guard against a
/// round being advanced twice; the state machine does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreLevelTracker {
    level: u32,
    max_levels: u32,
    score: u32,
}

impl ScoreLevelTracker {
    /// Starts at level 1 with no points. `max_levels` is at least 1.
    #[must_use]
    pub fn new(max_levels: u32) -> Self {
        Self {
            level: 1,
            max_levels: max_levels.max(1),
            score: 0,
        }
    }

    /// Current level, 1-based.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Number of levels in the game.
    #[must_use]
    pub const fn max_levels(&self) -> u32 {
        self.max_levels
    }

    /// Points so far.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Returns `true` on the last level.
    #[must_use]
    pub const fn is_last_level(&self) -> bool {
        self.level >= self.max_levels
    }

    /// Adds `points` and moves to the next level, or reports the game as
    /// complete when the current level was the last one.
    pub fn advance(&mut self, points: u32) -> Advance {
        self.score = self.score.saturating_add(points);
        if self.level < self.max_levels {
            self.level += 1;
            Advance::LevelComplete {
                level: self.level,
                score: self.score,
            }
        } else {
            Advance::GameComplete {
                final_score: self.score,
            }
        }
    }

    /// Adds partial credit without changing level.
    pub fn credit(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    /// Wrong answers cost nothing. Kept so callers can state intent.
    pub const fn penalize(&self) {}
}
