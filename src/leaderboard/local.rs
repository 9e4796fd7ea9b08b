//! Leaderboard kept in a local key-value slot

use super::{LeaderboardEntry, LeaderboardStore, Ranking, TimeFilter, now_ms};
use crate::error::StoreError;
use crate::persistence::{KeyValueStore, load_json, save_json};

/// Entries kept on device. Past this, the lowest-ranked entries older than
/// the widest time window are dropped.
pub const MAX_STORED_ENTRIES: usize = 200;

/// Leaderboard persisted as one JSON blob
pub struct LocalLeaderboard<S: KeyValueStore> {
    store: S,
    clock: fn() -> f64,
}

impl<S: KeyValueStore> LocalLeaderboard<S> {
    const STORAGE_KEY: &'static str = "flappy_sky_leaderboard";

    pub fn new(store: S) -> Self {
        Self::with_clock(store, now_ms)
    }

    /// Use a custom time source (ms since epoch)
    pub fn with_clock(store: S, clock: fn() -> f64) -> Self {
        Self { store, clock }
    }

    fn load(&self) -> Result<Ranking, StoreError> {
        Ok(load_json(&self.store, Self::STORAGE_KEY)?.unwrap_or_default())
    }
}

impl<S: KeyValueStore> LeaderboardStore for LocalLeaderboard<S> {
    async fn submit(&self, name: &str, score: u32) -> Result<LeaderboardEntry, StoreError> {
        let mut ranking = self.load()?;
        let now = (self.clock)();
        let entry = LeaderboardEntry {
            name: name.to_string(),
            score,
            submitted_at: now,
        };
        ranking.insert(entry.clone());
        ranking.prune(MAX_STORED_ENTRIES, now);
        let rank = ranking
            .rank_of(&entry)
            .ok_or_else(|| StoreError::Storage("new entry was pruned".to_string()))?;
        save_json(&self.store, Self::STORAGE_KEY, &ranking)?;
        log::info!("Score {} for {} stored at rank {}", score, entry.name, rank);
        Ok(entry)
    }

    async fn fetch_top(
        &self,
        k: usize,
        filter: TimeFilter,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let ranking = self.load()?;
        Ok(ranking.top(k, filter, (self.clock)()))
    }

    async fn fetch_global_best(&self) -> Result<u32, StoreError> {
        Ok(self.load()?.best_score().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::leaderboard::tests::block_on_ready;
    use crate::persistence::MemoryStore;

    fn fixed_clock() -> f64 {
        1_000_000.0
    }

    #[test]
    fn test_submit_then_fetch() {
        let board = LocalLeaderboard::with_clock(MemoryStore::new(), fixed_clock);
        block_on_ready(board.submit("ann", 4)).unwrap();
        block_on_ready(board.submit("bob", 9)).unwrap();
        block_on_ready(board.submit("cat", 4)).unwrap();

        let top = block_on_ready(board.fetch_top(10, TimeFilter::Daily)).unwrap();
        let names: Vec<_> = top.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["bob", "ann", "cat"]);
        assert_eq!(top[0].submitted_at, fixed_clock());
        assert_eq!(block_on_ready(board.fetch_global_best()).unwrap(), 9);
    }

    #[test]
    fn test_entries_survive_reopen() {
        let store = Rc::new(MemoryStore::new());
        let board = LocalLeaderboard::with_clock(Rc::clone(&store), fixed_clock);
        block_on_ready(board.submit("ann", 4)).unwrap();

        let reopened = LocalLeaderboard::with_clock(store, fixed_clock);
        assert_eq!(block_on_ready(reopened.fetch_top(10, TimeFilter::All)).unwrap().len(), 1);
    }

    #[test]
    fn test_full_board_still_keeps_todays_entry() {
        fn day_100() -> f64 {
            100.0 * crate::leaderboard::DAY_MS
        }

        let store = Rc::new(MemoryStore::new());
        let mut ranking = Ranking::new();
        for _ in 0..MAX_STORED_ENTRIES + 10 {
            ranking.insert(LeaderboardEntry {
                name: "old".to_string(),
                score: 100,
                submitted_at: 0.0,
            });
        }
        save_json(&store, "flappy_sky_leaderboard", &ranking).unwrap();

        let board = LocalLeaderboard::with_clock(Rc::clone(&store), day_100);
        block_on_ready(board.submit("ann", 5)).unwrap();

        let daily = block_on_ready(board.fetch_top(10, TimeFilter::Daily)).unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].name, "ann");

        // Old overflow is gone, the new entry sits right below the cap
        let all = block_on_ready(board.fetch_top(usize::MAX, TimeFilter::All)).unwrap();
        assert_eq!(all.len(), MAX_STORED_ENTRIES + 1);
        assert_eq!(all[MAX_STORED_ENTRIES].name, "ann");
    }

    #[test]
    fn test_empty_board() {
        let board = LocalLeaderboard::with_clock(MemoryStore::new(), fixed_clock);
        assert!(block_on_ready(board.fetch_top(10, TimeFilter::All)).unwrap().is_empty());
        assert_eq!(block_on_ready(board.fetch_global_best()).unwrap(), 0);
    }

    #[test]
    fn test_unavailable_storage_errors() {
        let board = LocalLeaderboard::with_clock(MemoryStore::failing(), fixed_clock);
        assert!(matches!(
            block_on_ready(board.submit("ann", 3)),
            Err(StoreError::Unavailable(_))
        ));
    }
}
