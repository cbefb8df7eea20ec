//! crates/study_planner_core/src/stats.rs
//!
//! Derives aggregate study statistics from a user's session history.

use chrono::{Duration, NaiveDate};
use std::collections::HashSet;

use crate::domain::{StudySession, UserStats};

/// Streaks are only counted this far back; longer runs report the cap.
const STREAK_WINDOW_DAYS: u32 = 30;

/// Computes total hours, session count and the current daily streak.
///
/// The streak walks backward from `today` one calendar day at a time and
/// stops at the first day without a session. Days are compared by the
/// session's calendar date, not its timestamp.
pub fn compute_stats(sessions: &[StudySession], today: NaiveDate) -> UserStats {
    let total_minutes: u64 = sessions.iter().map(|s| u64::from(s.duration)).sum();
    let total_hours = ((total_minutes as f64) / 60.0).round() as u32;

    let session_dates: HashSet<NaiveDate> =
        sessions.iter().map(|s| s.completed_at.date_naive()).collect();

    let mut current_streak = 0;
    for offset in 0..STREAK_WINDOW_DAYS {
        let day = today - Duration::days(i64::from(offset));
        if session_dates.contains(&day) {
            current_streak += 1;
        } else {
            break;
        }
    }

    UserStats {
        total_hours,
        completed_sessions: sessions.len() as u32,
        current_streak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn session_on(day: NaiveDate, duration: u32) -> StudySession {
        StudySession {
            id: 1,
            user_id: 1,
            schedule_id: None,
            subject: "Português".to_string(),
            duration,
            completed_at: Utc
                .from_utc_datetime(&day.and_hms_opt(9, 30, 0).unwrap()),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn empty_history_is_all_zeroes() {
        let stats = compute_stats(&[], today());
        assert_eq!(stats.total_hours, 0);
        assert_eq!(stats.completed_sessions, 0);
        assert_eq!(stats.current_streak, 0);
    }

    #[test]
    fn total_hours_rounds_minutes() {
        // 100 minutes -> 1.67h -> rounds to 2.
        let sessions = vec![session_on(today(), 40), session_on(today(), 60)];
        let stats = compute_stats(&sessions, today());
        assert_eq!(stats.total_hours, 2);
        assert_eq!(stats.completed_sessions, 2);
    }

    #[test]
    fn streak_counts_consecutive_days_ending_today() {
        let sessions: Vec<StudySession> = (0..4)
            .map(|i| session_on(today() - Duration::days(i), 30))
            .collect();
        let stats = compute_stats(&sessions, today());
        assert_eq!(stats.current_streak, 4);
    }

    #[test]
    fn streak_stops_at_first_gap() {
        // Sessions today, yesterday, then a gap, then three days ago.
        let sessions = vec![
            session_on(today(), 30),
            session_on(today() - Duration::days(1), 30),
            session_on(today() - Duration::days(3), 30),
        ];
        let stats = compute_stats(&sessions, today());
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn streak_is_zero_without_a_session_today() {
        let sessions = vec![session_on(today() - Duration::days(1), 30)];
        let stats = compute_stats(&sessions, today());
        assert_eq!(stats.current_streak, 0);
    }

    #[test]
    fn streak_caps_at_thirty_days() {
        let sessions: Vec<StudySession> = (0..45)
            .map(|i| session_on(today() - Duration::days(i), 30))
            .collect();
        let stats = compute_stats(&sessions, today());
        assert_eq!(stats.current_streak, 30);
    }

    #[test]
    fn multiple_sessions_on_one_day_count_once_for_streak() {
        let sessions = vec![session_on(today(), 30), session_on(today(), 45)];
        let stats = compute_stats(&sessions, today());
        assert_eq!(stats.current_streak, 1);
    }
}
