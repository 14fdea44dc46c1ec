//! High score leaderboard
//!
//! Top 10 runs by score, persisted as a bare JSON array.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of entries kept
pub const MAX_HIGH_SCORES: usize = 10;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub score: u32,
    /// Survival time in seconds
    pub time: u32,
    pub level: u32,
    /// When the run ended
    pub date: DateTime<Utc>,
}

impl LeaderboardEntry {
    /// Calendar date for display
    pub fn display_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Relative age, e.g. "3 mins ago"
    pub fn relative_date(&self, now: DateTime<Utc>) -> String {
        let age = now.signed_duration_since(self.date);
        let days = age.num_days();
        let hours = age.num_hours();
        let mins = age.num_minutes();

        if days >= 1 {
            match days {
                1 => "Yesterday".to_string(),
                2..=6 => format!("{} days ago", days),
                _ => self.display_date(),
            }
        } else if hours >= 1 {
            if hours == 1 {
                "1 hour ago".to_string()
            } else {
                format!("{} hours ago", hours)
            }
        } else if mins >= 1 {
            if mins == 1 {
                "1 min ago".to_string()
            } else {
                format!("{} mins ago", mins)
            }
        } else {
            "Just now".to_string()
        }
    }
}

/// Best score and its survival time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    pub score: u32,
    pub time: u32,
}

/// High score leaderboard, sorted by score descending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from arbitrary entries, restoring order and the size bound
    pub fn from_entries(mut entries: Vec<LeaderboardEntry>) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u32) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        Some(self.insertion_index(score) + 1)
    }

    /// Add an entry. Ties keep earlier entries ahead of the new one.
    /// Returns the rank achieved (1-indexed) or None if it fell off the end.
    pub fn insert(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        let pos = self.insertion_index(entry.score);
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        (pos < MAX_HIGH_SCORES).then_some(pos + 1)
    }

    pub fn top(&self) -> Option<&LeaderboardEntry> {
        self.entries.first()
    }

    /// Best run, or zeros when empty
    pub fn high_score(&self) -> HighScore {
        self.top()
            .map(|e| HighScore {
                score: e.score,
                time: e.time,
            })
            .unwrap_or_default()
    }

    fn insertion_index(&self, score: u32) -> usize {
        self.entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len())
    }
}

/// Medal or rank label for a 0-based leaderboard position
pub fn rank_label(index: usize) -> String {
    match index {
        0 => "🥇".to_string(),
        1 => "🥈".to_string(),
        2 => "🥉".to_string(),
        _ => format!("{}.", index + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn entry(score: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            score,
            time: score / 10,
            level: 1,
            date: at(score as i64),
        }
    }

    fn full_board() -> Leaderboard {
        Leaderboard::from_entries((1..=10).map(|i| entry(i * 100)).collect())
    }

    #[test]
    fn test_from_entries_sorts_and_bounds() {
        let board = Leaderboard::from_entries((0..15).map(|i| entry(i * 10)).collect());
        assert_eq!(board.len(), MAX_HIGH_SCORES);
        assert_eq!(board.top().map(|e| e.score), Some(140));
        assert!(board.entries().windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_insert_into_full_board_evicts_lowest() {
        let mut board = full_board();
        assert!(board.qualifies(150));
        assert_eq!(board.potential_rank(150), Some(10));

        let rank = board.insert(entry(150));
        assert_eq!(rank, Some(10));
        assert_eq!(board.len(), 10);
        assert!(board.entries().iter().any(|e| e.score == 150));
        assert!(board.entries().iter().all(|e| e.score != 100));
        assert!(board.entries().windows(2).all(|w| w[0].score > w[1].score));
    }

    #[test]
    fn test_low_score_falls_off() {
        let mut board = full_board();
        assert!(!board.qualifies(100));
        assert_eq!(board.potential_rank(50), None);
        assert_eq!(board.insert(entry(50)), None);
        assert_eq!(board, full_board());
    }

    #[test]
    fn test_ties_rank_after_existing() {
        let mut board = Leaderboard::new();
        board.insert(entry(300));
        let mut later = entry(300);
        later.date = at(9999);
        assert_eq!(board.insert(later.clone()), Some(2));
        assert_eq!(board.entries()[1], later);
    }

    #[test]
    fn test_high_score() {
        assert_eq!(Leaderboard::new().high_score(), HighScore::default());
        let board = full_board();
        assert_eq!(
            board.high_score(),
            HighScore {
                score: 1000,
                time: 100
            }
        );
    }

    #[test]
    fn test_serializes_as_array() {
        let mut board = Leaderboard::new();
        board.insert(entry(120));
        let json = serde_json::to_string(&board).unwrap();
        assert!(json.starts_with("[{"));
        assert!(json.contains("\"score\":120"));

        // JavaScript Date.toISOString() output parses
        let parsed: Leaderboard = serde_json::from_str(
            r#"[{"score":50,"time":5,"level":1,"date":"2024-05-01T12:30:00.000Z"}]"#,
        )
        .unwrap();
        assert_eq!(parsed.entries()[0].display_date(), "2024-05-01");
    }

    #[test]
    fn test_relative_date() {
        let e = entry(0);
        assert_eq!(e.relative_date(e.date + Duration::seconds(30)), "Just now");
        assert_eq!(e.relative_date(e.date + Duration::minutes(5)), "5 mins ago");
        assert_eq!(e.relative_date(e.date + Duration::hours(1)), "1 hour ago");
        assert_eq!(e.relative_date(e.date + Duration::days(1)), "Yesterday");
        assert_eq!(e.relative_date(e.date + Duration::days(3)), "3 days ago");
        assert_eq!(
            e.relative_date(e.date + Duration::days(30)),
            e.display_date()
        );
    }

    #[test]
    fn test_rank_labels() {
        assert_eq!(rank_label(0), "🥇");
        assert_eq!(rank_label(3), "4.");
    }
}
