//! Cache admission policy.
//!
//! Decides, per endpoint and payload, whether a response may be cached and
//! for how many days.
//!
//! | Endpoint | Decision |
//! |---|---|
//! | `/api/trips` | 1 day |
//! | `/api/trips/{id}` | 365 days once `endtime` is in the past |
//! | `/api/location/history/timestamp/{ts}` | 365 days when `time` is a whole number of seconds within 60 hours of `ts` |
//! | `/api/location/latest` | never |

use chrono::{DateTime, SecondsFormat, Utc};

use crate::routing::Endpoint;
use crate::trip::TripPayload;

pub const SECONDS_PER_DAY: u64 = 86_400;

/// Days the trip index may be served from cache.
pub const TRIP_INDEX_TTL_DAYS: u32 = 1;

/// Days a finished trip or historical location may be served from cache.
pub const ARCHIVE_TTL_DAYS: u32 = 365;

/// Maximum skew, in hours, between a requested timestamp and the reported one.
pub const HISTORY_MAX_SKEW_HOURS: f64 = 60.0;

/// Outcome of the cache policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    NotCacheable,
    Cacheable { days: u32 },
}

impl CacheDecision {
    /// Time to live in seconds, if cacheable.
    pub fn ttl_seconds(&self) -> Option<u64> {
        match self {
            CacheDecision::NotCacheable => None,
            CacheDecision::Cacheable { days } => Some(u64::from(*days) * SECONDS_PER_DAY),
        }
    }

    pub fn is_cacheable(&self) -> bool {
        matches!(self, CacheDecision::Cacheable { .. })
    }
}

/// Decide whether the response for `endpoint` may be cached.
pub fn decide(endpoint: &Endpoint, payload: &TripPayload, now: DateTime<Utc>) -> CacheDecision {
    match endpoint {
        Endpoint::TripIndex => CacheDecision::Cacheable {
            days: TRIP_INDEX_TTL_DAYS,
        },
        Endpoint::Trip { .. } => {
            let now = now.timestamp_millis() as f64 / 1000.0;
            match payload.end_time() {
                Some(end) if end < now => CacheDecision::Cacheable {
                    days: ARCHIVE_TTL_DAYS,
                },
                _ => CacheDecision::NotCacheable,
            }
        }
        Endpoint::LocationHistory { timestamp } => match payload.time() {
            Some(time) if is_stable_record(time, *timestamp) => CacheDecision::Cacheable {
                days: ARCHIVE_TTL_DAYS,
            },
            _ => CacheDecision::NotCacheable,
        },
        Endpoint::LatestLocation => CacheDecision::NotCacheable,
    }
}

fn is_stable_record(reported: f64, requested: u64) -> bool {
    let difference = reported - requested as f64;
    difference.fract() == 0.0 && difference.abs() / 3600.0 < HISTORY_MAX_SKEW_HOURS
}

/// Freshness metadata attached to a cacheable response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    pub days: u32,
    pub fetched_at: DateTime<Utc>,
}

impl Freshness {
    pub fn new(decision: CacheDecision, fetched_at: DateTime<Utc>) -> Option<Self> {
        match decision {
            CacheDecision::Cacheable { days } => Some(Self { days, fetched_at }),
            CacheDecision::NotCacheable => None,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        u64::from(self.days) * SECONDS_PER_DAY
    }

    /// Value for the `Cache-Control` header.
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.ttl_seconds())
    }

    /// Human-readable description for the debug header.
    pub fn describe(&self) -> String {
        format!(
            "ttl={}d ({}s); fetched={}",
            self.days,
            self.ttl_seconds(),
            self.fetched_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn payload(document: serde_json::Value) -> TripPayload {
        TripPayload::from_value(document)
    }

    #[test]
    fn test_trip_index_always_one_day() {
        for document in [json!({}), json!({ "trips": [] }), json!(null)] {
            assert_eq!(
                decide(&Endpoint::TripIndex, &payload(document), now()),
                CacheDecision::Cacheable { days: 1 }
            );
        }
    }

    #[test]
    fn test_finished_trip_cached_for_a_year() {
        let trip = Endpoint::Trip { id: 42 };

        let finished = payload(json!({ "endtime": 1_600_000_000 }));
        assert_eq!(
            decide(&trip, &finished, now()),
            CacheDecision::Cacheable { days: 365 }
        );

        let ongoing = payload(json!({ "endtime": 1_800_000_000 }));
        assert_eq!(decide(&trip, &ongoing, now()), CacheDecision::NotCacheable);

        let ending_now = payload(json!({ "endtime": 1_700_000_000 }));
        assert_eq!(decide(&trip, &ending_now, now()), CacheDecision::NotCacheable);

        let unknown = payload(json!({ "endtime": null }));
        assert_eq!(decide(&trip, &unknown, now()), CacheDecision::NotCacheable);
    }

    #[test]
    fn test_history_within_skew() {
        let history = Endpoint::LocationHistory {
            timestamp: 1_000_000_000,
        };

        let exact = payload(json!({ "time": 1_000_000_000 }));
        assert_eq!(
            decide(&history, &exact, now()),
            CacheDecision::Cacheable { days: 365 }
        );

        let earlier = payload(json!({ "time": 1_000_000_000 - 59 * 3600 }));
        assert!(decide(&history, &earlier, now()).is_cacheable());

        let at_limit = payload(json!({ "time": 1_000_000_000 + 60 * 3600 }));
        assert!(!decide(&history, &at_limit, now()).is_cacheable());

        let fractional = payload(json!({ "time": 1_000_000_000.5 }));
        assert!(!decide(&history, &fractional, now()).is_cacheable());

        let missing = payload(json!({ "trips": [{}] }));
        assert!(!decide(&history, &missing, now()).is_cacheable());
    }

    #[test]
    fn test_latest_never_cached() {
        let document = payload(json!({ "time": 1_000_000_000, "endtime": 1 }));
        assert_eq!(
            decide(&Endpoint::LatestLocation, &document, now()),
            CacheDecision::NotCacheable
        );
    }

    #[test]
    fn test_ttl_and_headers() {
        assert_eq!(CacheDecision::Cacheable { days: 1 }.ttl_seconds(), Some(86_400));
        assert_eq!(CacheDecision::NotCacheable.ttl_seconds(), None);

        let freshness = Freshness::new(CacheDecision::Cacheable { days: 365 }, now()).unwrap();
        assert_eq!(freshness.cache_control(), "public, max-age=31536000");
        assert_eq!(
            freshness.describe(),
            "ttl=365d (31536000s); fetched=2023-11-14T22:13:20Z"
        );

        assert!(Freshness::new(CacheDecision::NotCacheable, now()).is_none());
    }
}
