//! Session score and persisted best score
//!
//! Score is the floor of accumulated game time, where each second of scaled
//! time counts `multiplier` times. The best score is a running maximum kept in
//! the key-value store.

use crate::persistence::{BEST_SCORE_KEY, KeyValueStore};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreKeeper {
    game_time: f64,
    /// Score frozen at the last death, restored on continue
    stored: u32,
}

impl ScoreKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u32 {
        self.game_time.floor() as u32
    }

    pub fn game_time(&self) -> f64 {
        self.game_time
    }

    /// Add scaled time; returns true if the integer score changed
    pub fn accumulate(&mut self, dt: f32, multiplier: u32) -> bool {
        if dt <= 0.0 {
            return false;
        }
        let before = self.score();
        self.game_time += dt as f64 * multiplier as f64;
        self.score() != before
    }

    /// Freeze the current score for a later continue
    pub fn store(&mut self) -> u32 {
        self.stored = self.score();
        self.stored
    }

    pub fn stored(&self) -> u32 {
        self.stored
    }

    /// Resume from the stored score
    pub fn restore(&mut self) {
        self.game_time = self.stored as f64;
    }

    pub fn reset(&mut self) {
        self.game_time = 0.0;
        self.stored = 0;
    }

    /// Fold `score` into the persisted best; returns the best after the update
    pub fn submit_best<S: KeyValueStore + ?Sized>(score: u32, store: &mut S) -> u32 {
        let best = store.get(BEST_SCORE_KEY, 0);
        if score > best {
            log::info!("New best score: {}", score);
            store.set(BEST_SCORE_KEY, score);
            score
        } else {
            best
        }
    }

    pub fn best<S: KeyValueStore + ?Sized>(store: &S) -> u32 {
        store.get(BEST_SCORE_KEY, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_multiplier_scales_accrual() {
        let mut keeper = ScoreKeeper::new();
        for _ in 0..10 {
            keeper.accumulate(0.5, 1);
        }
        assert_eq!(keeper.score(), 5);
        keeper.accumulate(1.0, 2);
        assert_eq!(keeper.score(), 7);
        assert!(!keeper.accumulate(0.0, 2));
    }

    #[test]
    fn test_store_and_restore() {
        let mut keeper = ScoreKeeper::new();
        keeper.accumulate(12.7, 1);
        assert_eq!(keeper.store(), 12);
        keeper.accumulate(3.0, 1);
        keeper.restore();
        assert_eq!(keeper.score(), 12);

        keeper.reset();
        assert_eq!(keeper.score(), 0);
        assert_eq!(keeper.stored(), 0);
    }

    #[test]
    fn test_best_is_running_max() {
        let mut store = MemoryStore::new();
        assert_eq!(ScoreKeeper::submit_best(40, &mut store), 40);
        assert_eq!(ScoreKeeper::submit_best(25, &mut store), 40);
        assert_eq!(ScoreKeeper::best(&store), 40);
        assert_eq!(ScoreKeeper::submit_best(41, &mut store), 41);
    }
}
