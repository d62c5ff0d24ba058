//! Stable signal identity used as the dedup key.
//!
//! `id = hex(sha256("{symbol}|{timeframe}|{kind}|{timestamp}"))`, where the
//! timestamp is RFC 3339 with an explicit `±HH:MM` offset (never `Z`),
//! whole seconds, and fractional digits only when non-zero.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use divmon_types::{DivergenceSignal, SignalKind};
use sha2::{Digest, Sha256};

/// Fixed timestamp serialization used inside the identity key.
#[must_use]
pub fn format_pivot_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

fn sha256_hex(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Derives the dedup key for a pivot.
#[must_use]
pub fn signal_id(
    symbol: &str,
    timeframe: &str,
    kind: SignalKind,
    pivot_timestamp: &DateTime<FixedOffset>,
) -> String {
    let key = format!(
        "{symbol}|{timeframe}|{}|{}",
        kind.as_str(),
        format_pivot_timestamp(pivot_timestamp)
    );
    sha256_hex(&key)
}

/// Dedup key of a detected signal.
#[must_use]
pub fn signal_key(signal: &DivergenceSignal) -> String {
    signal_id(
        &signal.symbol,
        &signal.timeframe,
        signal.kind,
        &signal.pivot_timestamp,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn toronto_ts() -> DateTime<FixedOffset> {
        FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 5, 10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_timestamp_format_keeps_offset() {
        assert_eq!(
            format_pivot_timestamp(&toronto_ts()),
            "2026-01-05T10:30:00-05:00"
        );
        let utc = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 5, 15, 30, 0)
            .unwrap();
        assert_eq!(format_pivot_timestamp(&utc), "2026-01-05T15:30:00+00:00");
        let fractional = utc + Duration::milliseconds(250);
        assert_eq!(
            format_pivot_timestamp(&fractional),
            "2026-01-05T15:30:00.250+00:00"
        );
    }

    #[test]
    fn test_signal_id_is_deterministic() {
        let ts = toronto_ts();
        let a = signal_id("SMCI", "10m", SignalKind::Bullish, &ts);
        let b = signal_id("SMCI", "10m", SignalKind::Bullish, &ts);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_signal_id_matches_known_digest() {
        let expected = sha256_hex("SMCI|10m|bullish|2026-01-05T10:30:00-05:00");
        assert_eq!(
            signal_id("SMCI", "10m", SignalKind::Bullish, &toronto_ts()),
            expected
        );
        // sha256("abc")
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_signal_id_sensitive_to_every_field() {
        let ts = toronto_ts();
        let base = signal_id("SMCI", "10m", SignalKind::Bullish, &ts);
        assert_ne!(base, signal_id("SMCI", "10m", SignalKind::Bearish, &ts));
        assert_ne!(base, signal_id("AAPL", "10m", SignalKind::Bullish, &ts));
        assert_ne!(base, signal_id("SMCI", "5m", SignalKind::Bullish, &ts));
        assert_ne!(
            base,
            signal_id("SMCI", "10m", SignalKind::Bullish, &(ts + Duration::minutes(10)))
        );
    }

    #[test]
    fn test_same_instant_different_offset_differs() {
        let ts = toronto_ts();
        let utc = ts.with_timezone(&FixedOffset::east_opt(0).unwrap());
        assert_ne!(
            signal_id("SMCI", "10m", SignalKind::Bullish, &ts),
            signal_id("SMCI", "10m", SignalKind::Bullish, &utc)
        );
    }
}
