use std::collections::HashMap;
use std::time::{Duration, SystemTime};

/// Minute buckets older than this are dropped.
pub const DEFAULT_RETENTION_MINUTES: u64 = 60;
/// Distinct UIDs tracked at once; further UIDs are folded into [`OVERFLOW_UID`].
pub const DEFAULT_MAX_UIDS: usize = 10_000;
pub const OVERFLOW_UID: &str = "<overflow>";

/// How a validation request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// MAC matched.
    Valid,
    /// MAC computed but did not match.
    Invalid,
    /// Request rejected before or during input validation (4xx).
    Rejected,
    /// Internal failure or timeout (5xx).
    Failed,
}

type MinuteCounts = HashMap<u64, HashMap<Outcome, u64>>;

#[derive(Default)]
struct Store {
    counts: HashMap<String, MinuteCounts>,
    pruned_at: u64,
}

/// In-memory per-minute outcome counts keyed by tag UID, bounded in both
/// age and number of keys.
pub struct Metrics {
    store: std::sync::Mutex<Store>,
    retention_minutes: u64,
    max_uids: usize,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::with_limits(DEFAULT_RETENTION_MINUTES, DEFAULT_MAX_UIDS)
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(retention_minutes: u64, max_uids: usize) -> Self {
        Self {
            store: std::sync::Mutex::new(Store::default()),
            retention_minutes: retention_minutes.max(1),
            max_uids: max_uids.max(1),
        }
    }

    /// Record an outcome using the current wall-clock time.
    pub fn record(&self, uid: &str, outcome: Outcome) {
        self.record_at(uid, outcome, SystemTime::now());
    }

    /// Record an outcome at a provided time (useful for tests).
    pub fn record_at(&self, uid: &str, outcome: Outcome, at: SystemTime) {
        let minute = Self::minute_bucket(at);
        let Ok(mut guard) = self.store.lock() else {
            log::warn!("metrics store poisoned, dropping sample");
            return;
        };
        let store = &mut *guard;

        if minute > store.pruned_at {
            let retention = self.retention_minutes;
            store.counts.retain(|_, minutes| {
                minutes.retain(|m, _| m + retention > minute);
                !minutes.is_empty()
            });
            store.pruned_at = minute;
        }

        let key = if store.counts.contains_key(uid) || store.counts.len() < self.max_uids {
            uid
        } else {
            OVERFLOW_UID
        };

        *store
            .counts
            .entry(key.to_string())
            .or_default()
            .entry(minute)
            .or_default()
            .entry(outcome)
            .or_insert(0) += 1;
    }

    /// Per-minute counts for a UID. Empty when the UID was never seen.
    pub fn snapshot(&self, uid: &str) -> MinuteCounts {
        self.store
            .lock()
            .ok()
            .and_then(|guard| guard.counts.get(uid).cloned())
            .unwrap_or_default()
    }

    /// Counts for a UID summed over all retained minutes.
    pub fn totals(&self, uid: &str) -> HashMap<Outcome, u64> {
        let mut totals = HashMap::new();
        for minute in self.snapshot(uid).values() {
            for (outcome, count) in minute {
                *totals.entry(*outcome).or_insert(0) += *count;
            }
        }
        totals
    }

    /// Number of keys currently held.
    pub fn tracked_uids(&self) -> usize {
        self.store.lock().map(|guard| guard.counts.len()).unwrap_or(0)
    }

    fn minute_bucket(at: SystemTime) -> u64 {
        at.duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
            / 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_minute(minute: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(minute * 60 + 5)
    }

    #[test]
    fn minute_bucket_groups_by_60_seconds() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(59);
        let t1 = SystemTime::UNIX_EPOCH + Duration::from_secs(60);
        assert_eq!(Metrics::minute_bucket(t0), 0);
        assert_eq!(Metrics::minute_bucket(t1), 1);
    }

    #[test]
    fn record_and_snapshot_counts() {
        let metrics = Metrics::new();
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(5);
        let t1 = SystemTime::UNIX_EPOCH + Duration::from_secs(65);

        metrics.record_at("04112233445566", Outcome::Valid, t0);
        metrics.record_at("04112233445566", Outcome::Invalid, t0);
        metrics.record_at("04112233445566", Outcome::Valid, t1);

        let snap = metrics.snapshot("04112233445566");
        assert_eq!(snap[&0].get(&Outcome::Valid), Some(&1));
        assert_eq!(snap[&0].get(&Outcome::Invalid), Some(&1));
        assert_eq!(snap[&1].get(&Outcome::Valid), Some(&1));

        let totals = metrics.totals("04112233445566");
        assert_eq!(totals.get(&Outcome::Valid), Some(&2));
        assert_eq!(totals.get(&Outcome::Invalid), Some(&1));
    }

    #[test]
    fn snapshot_unknown_uid_is_empty() {
        let metrics = Metrics::new();
        assert!(metrics.snapshot("missing").is_empty());
        assert!(metrics.totals("missing").is_empty());
    }

    #[test]
    fn old_minutes_are_pruned() {
        let metrics = Metrics::with_limits(10, 100);
        metrics.record_at("04AAAAAAAAAAAA", Outcome::Valid, at_minute(100));
        metrics.record_at("04BBBBBBBBBBBB", Outcome::Valid, at_minute(105));

        metrics.record_at("04BBBBBBBBBBBB", Outcome::Invalid, at_minute(111));

        assert!(metrics.snapshot("04AAAAAAAAAAAA").is_empty());
        let kept = metrics.snapshot("04BBBBBBBBBBBB");
        assert!(kept.contains_key(&105));
        assert!(kept.contains_key(&111));
        assert_eq!(metrics.tracked_uids(), 1);
    }

    #[test]
    fn uid_count_is_capped() {
        let metrics = Metrics::with_limits(60, 2);
        let t = at_minute(1);
        metrics.record_at("a", Outcome::Valid, t);
        metrics.record_at("b", Outcome::Valid, t);
        metrics.record_at("c", Outcome::Rejected, t);
        metrics.record_at("d", Outcome::Rejected, t);
        metrics.record_at("a", Outcome::Valid, t);

        assert_eq!(metrics.totals("a").get(&Outcome::Valid), Some(&2));
        assert!(metrics.snapshot("c").is_empty());
        assert_eq!(
            metrics.totals(OVERFLOW_UID).get(&Outcome::Rejected),
            Some(&2)
        );
        assert_eq!(metrics.tracked_uids(), 3);
    }
}
