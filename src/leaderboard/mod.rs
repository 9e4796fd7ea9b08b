//! Leaderboard: ranked score entries and the stores that hold them
//!
//! Ranking is score descending; equal scores keep submission order, so the
//! earliest submission ranks first.

mod local;
#[cfg(target_arch = "wasm32")]
mod remote;

pub use local::LocalLeaderboard;
#[cfg(target_arch = "wasm32")]
pub use remote::RestLeaderboard;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_NAME_LEN;
use crate::error::{GameError, StoreError};

const HOUR_MS: f64 = 60.0 * 60.0 * 1000.0;
const DAY_MS: f64 = 24.0 * HOUR_MS;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    /// Unix timestamp (ms) of submission
    pub submitted_at: f64,
}

/// Rolling time windows for the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimeFilter {
    #[default]
    All,
    /// Last 24 hours
    Daily,
    /// Last 7 days
    Weekly,
    /// Last 30 days
    Monthly,
}

impl TimeFilter {
    pub const ALL: [TimeFilter; 4] = [
        TimeFilter::All,
        TimeFilter::Daily,
        TimeFilter::Weekly,
        TimeFilter::Monthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::All => "All time",
            TimeFilter::Daily => "Today",
            TimeFilter::Weekly => "This week",
            TimeFilter::Monthly => "This month",
        }
    }

    /// Window length in ms (None = unbounded)
    pub fn window_ms(&self) -> Option<f64> {
        match self {
            TimeFilter::All => None,
            TimeFilter::Daily => Some(DAY_MS),
            TimeFilter::Weekly => Some(7.0 * DAY_MS),
            TimeFilter::Monthly => Some(30.0 * DAY_MS),
        }
    }

    /// Oldest timestamp still inside the window
    pub fn cutoff(&self, now: f64) -> Option<f64> {
        self.window_ms().map(|w| now - w)
    }

    pub fn includes(&self, entry: &LeaderboardEntry, now: f64) -> bool {
        self.cutoff(now).is_none_or(|cutoff| entry.submitted_at >= cutoff)
    }
}

/// Ordered entry list (best first)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub entries: Vec<LeaderboardEntry>,
}

impl Ranking {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert keeping order. Returns the 1-indexed rank.
    pub fn insert(&mut self, entry: LeaderboardEntry) -> usize {
        // After every entry with an equal score: earliest submission wins ties
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        pos + 1
    }

    /// Drop entries ranked below `max`, except those still inside the widest
    /// time window; they may yet belong to a daily/weekly/monthly top-K.
    pub fn prune(&mut self, max: usize, now: f64) {
        let mut rank = 0;
        self.entries.retain(|e| {
            rank += 1;
            rank <= max || TimeFilter::Monthly.includes(e, now)
        });
    }

    /// 1-indexed rank of `entry`, if present
    pub fn rank_of(&self, entry: &LeaderboardEntry) -> Option<usize> {
        self.entries.iter().position(|e| e == entry).map(|i| i + 1)
    }

    /// Best `k` entries inside `filter`'s window
    pub fn top(&self, k: usize, filter: TimeFilter, now: f64) -> Vec<LeaderboardEntry> {
        self.entries
            .iter()
            .filter(|e| filter.includes(e, now))
            .take(k)
            .cloned()
            .collect()
    }

    pub fn best_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }
}

/// Rank (1-indexed) `score` would take in an already-ordered top-`k` view,
/// or None if it does not make the cut. A zero score never qualifies.
pub fn potential_rank(top: &[LeaderboardEntry], k: usize, score: u32) -> Option<usize> {
    if score == 0 {
        return None;
    }
    let rank = top.iter().position(|e| score > e.score).unwrap_or(top.len()) + 1;
    (rank <= k).then_some(rank)
}

/// Trim and check a player name
pub fn validate_name(raw: &str) -> Result<String, GameError> {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(GameError::InvalidName);
    }
    Ok(name.to_string())
}

/// Current wall-clock time in ms since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Format a timestamp relative to `now` ("Just now", "3 hours ago", ...)
pub fn format_age(timestamp: f64, now: f64) -> String {
    let diff_mins = ((now - timestamp) / 60_000.0).max(0.0);
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as u32;
        if days == 1 {
            "Yesterday".to_string()
        } else {
            format!("{} days ago", days)
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as u32;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as u32;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

/// Where leaderboard entries live. Calls may suspend on network I/O; callers
/// run them detached and feed results back into the game.
#[allow(async_fn_in_trait)]
pub trait LeaderboardStore {
    /// Record a (validated) name and score
    async fn submit(&self, name: &str, score: u32) -> Result<LeaderboardEntry, StoreError>;

    /// Best `k` entries in the window, best first
    async fn fetch_top(
        &self,
        k: usize,
        filter: TimeFilter,
    ) -> Result<Vec<LeaderboardEntry>, StoreError>;

    /// Highest score ever submitted (0 when empty)
    async fn fetch_global_best(&self) -> Result<u32, StoreError>;
}
