//! Derived agent statistics
//!
//! Success rate and uptime are pure functions of an agent's task counters
//! and the current time.

use chrono::{DateTime, Utc};

use crate::models::{parse_timestamp, round_to, AgentStats, AgentTaskCounters};

/// Computes derived statistics from agent task counters
pub struct AgentStatsCalculator;

impl AgentStatsCalculator {
    /// Percentage of finished tasks that succeeded, to one decimal
    ///
    /// Defined as 0.0 when no task has finished yet.
    pub fn success_rate(completed: u64, failed: u64) -> f64 {
        if completed == 0 && failed == 0 {
            return 0.0;
        }
        let total = completed as f64 + failed as f64;
        round_to(completed as f64 / total * 100.0, 1)
    }

    /// Share of the agent's lifetime that elapsed before its last activity
    ///
    /// `(last_activity - created_at) / (now - created_at) * 100`, clamped to
    /// `[0, 100]` and rounded to one decimal. This is not a measure of time
    /// spent running: an agent active once and never again still reports
    /// 100% at the instant of that activity. Missing or unparseable
    /// timestamps, and a non-positive lifetime, yield 0.0.
    pub fn uptime_percentage(
        created_at: Option<&str>,
        last_activity: Option<&str>,
        now: DateTime<Utc>,
    ) -> f64 {
        let (Some(created), Some(last_active)) = (
            created_at.and_then(parse_timestamp),
            last_activity.and_then(parse_timestamp),
        ) else {
            return 0.0;
        };

        let total_ms = (now - created).num_milliseconds();
        if total_ms <= 0 {
            return 0.0;
        }
        let active_ms = (last_active - created).num_milliseconds();

        let percentage = active_ms as f64 / total_ms as f64 * 100.0;
        round_to(percentage.clamp(0.0, 100.0), 1)
    }

    /// Compose success rate and uptime for one counters record
    pub fn compute_stats(counters: &AgentTaskCounters, now: DateTime<Utc>) -> AgentStats {
        AgentStats {
            tasks_completed: counters.tasks_completed,
            tasks_failed: counters.tasks_failed,
            success_rate: Self::success_rate(counters.tasks_completed, counters.tasks_failed),
            average_response_time: counters.average_response_time,
            last_activity: counters.last_activity.clone(),
            uptime_percentage: Self::uptime_percentage(
                counters.created_at.as_deref(),
                counters.last_activity.as_deref(),
                now,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::format_timestamp;
    use chrono::{Duration, TimeZone};

    fn at(hours: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
    }

    fn ts(hours: i64) -> String {
        format_timestamp(at(hours))
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(AgentStatsCalculator::success_rate(0, 0), 0.0);
        assert_eq!(AgentStatsCalculator::success_rate(9, 1), 90.0);
        assert_eq!(AgentStatsCalculator::success_rate(1, 0), 100.0);
        assert_eq!(AgentStatsCalculator::success_rate(0, 5), 0.0);
        assert_eq!(AgentStatsCalculator::success_rate(2, 1), 66.7);
    }

    #[test]
    fn test_success_rate_with_saturated_counters() {
        assert_eq!(AgentStatsCalculator::success_rate(u64::MAX, 1), 100.0);
        assert_eq!(AgentStatsCalculator::success_rate(1, u64::MAX), 0.0);
        assert_eq!(AgentStatsCalculator::success_rate(u64::MAX, u64::MAX), 50.0);
    }

    #[test]
    fn test_uptime_halfway() {
        let uptime =
            AgentStatsCalculator::uptime_percentage(Some(&ts(0)), Some(&ts(5)), at(10));
        assert_eq!(uptime, 50.0);
    }

    #[test]
    fn test_uptime_zero_when_created_now() {
        for last in [ts(0), ts(-3), ts(7)] {
            assert_eq!(
                AgentStatsCalculator::uptime_percentage(Some(&ts(0)), Some(&last), at(0)),
                0.0
            );
        }
    }

    #[test]
    fn test_uptime_zero_when_created_in_future() {
        assert_eq!(
            AgentStatsCalculator::uptime_percentage(Some(&ts(5)), Some(&ts(6)), at(1)),
            0.0
        );
    }

    #[test]
    fn test_uptime_clamps_to_range() {
        // last activity after now
        assert_eq!(
            AgentStatsCalculator::uptime_percentage(Some(&ts(0)), Some(&ts(20)), at(10)),
            100.0
        );
        // last activity before creation (clock skew)
        assert_eq!(
            AgentStatsCalculator::uptime_percentage(Some(&ts(0)), Some(&ts(-4)), at(10)),
            0.0
        );
    }

    #[test]
    fn test_uptime_missing_or_unparseable() {
        assert_eq!(
            AgentStatsCalculator::uptime_percentage(None, Some(&ts(1)), at(2)),
            0.0
        );
        assert_eq!(
            AgentStatsCalculator::uptime_percentage(Some(&ts(0)), None, at(2)),
            0.0
        );
        assert_eq!(
            AgentStatsCalculator::uptime_percentage(Some("garbage"), Some(&ts(1)), at(2)),
            0.0
        );
    }

    #[test]
    fn test_compute_stats() {
        let counters = AgentTaskCounters {
            id: "c1".to_string(),
            agent_id: "a1".to_string(),
            tasks_completed: 9,
            tasks_failed: 1,
            average_response_time: 120.5,
            last_activity: Some(ts(3)),
            created_at: Some(ts(0)),
        };

        let stats = AgentStatsCalculator::compute_stats(&counters, at(4));
        assert_eq!(stats.tasks_completed, 9);
        assert_eq!(stats.tasks_failed, 1);
        assert_eq!(stats.success_rate, 90.0);
        assert_eq!(stats.average_response_time, 120.5);
        assert_eq!(stats.last_activity, Some(ts(3)));
        assert_eq!(stats.uptime_percentage, 75.0);
    }
}
