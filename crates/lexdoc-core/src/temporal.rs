//! # Temporal Types
//!
//! `Timestamp` is UTC with seconds precision. Version rows, lock leases,
//! workflow deadlines and signature payloads all carry one, and signature
//! payloads depend on it serializing identically on every host:
//! `YYYY-MM-DDTHH:MM:SSZ`.
//!
//! Background jobs take `now: Timestamp` as a parameter so retention and
//! escalation can be tested without a clock.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LexdocError;

/// A UTC timestamp, truncated to seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string with a `Z` suffix.
    ///
    /// Offsets other than `Z` are rejected, including `+00:00`.
    pub fn parse(s: &str) -> Result<Self, LexdocError> {
        if !s.ends_with('Z') {
            return Err(LexdocError::Parse(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| LexdocError::Parse(format!("invalid RFC 3339 timestamp {s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// From Unix epoch seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, LexdocError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| LexdocError::Parse(format!("invalid Unix timestamp: {secs}")))
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// The instant `d` after this one. Saturates at the representable range.
    pub fn plus(&self, d: Duration) -> Self {
        Self(self.0.checked_add_signed(d).unwrap_or(self.0))
    }

    /// The instant `d` before this one. Saturates at the representable range.
    pub fn minus(&self, d: Duration) -> Self {
        Self(self.0.checked_sub_signed(d).unwrap_or(self.0))
    }

    /// Elapsed time from `earlier` to `self`; negative if `earlier` is later.
    pub fn since(&self, earlier: &Timestamp) -> Duration {
        self.0.signed_duration_since(earlier.0)
    }

    /// Render as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn now_has_no_subseconds() {
        assert_eq!(Timestamp::now().as_datetime().nanosecond(), 0);
    }

    #[test]
    fn from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 15).unwrap()
            + Duration::milliseconds(750);
        let ts = Timestamp::from_utc(dt);
        assert_eq!(ts.to_iso8601(), "2026-03-01T09:30:15Z");
    }

    #[test]
    fn parse_accepts_z_and_rejects_offsets() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        assert_eq!(ts.to_string(), "2026-01-15T12:00:00Z");
        assert!(Timestamp::parse("2026-01-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2026-01-15T12:00:00+03:00").is_err());
        assert!(Timestamp::parse("yesterday").is_err());
    }

    #[test]
    fn arithmetic() {
        let t0 = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let t1 = t0.plus(Duration::days(90));
        assert_eq!(t1.to_iso8601(), "2026-04-01T00:00:00Z");
        assert_eq!(t1.since(&t0), Duration::days(90));
        assert_eq!(t1.minus(Duration::days(90)), t0);
        assert!(t0.since(&t1) < Duration::zero());
    }

    #[test]
    fn serde_matches_iso8601() {
        let ts = Timestamp::parse("2026-06-30T23:59:59Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2026-06-30T23:59:59Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn epoch_roundtrip() {
        let ts = Timestamp::from_epoch_secs(1_800_000_000).unwrap();
        assert_eq!(ts.epoch_secs(), 1_800_000_000);
    }
}
