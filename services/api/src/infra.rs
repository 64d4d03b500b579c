use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use veille::workflows::opportunities::OpportunityEngine;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) engine: Arc<OpportunityEngine>,
}

/// Accepts RFC 3339 instants, or a bare `YYYY-MM-DD` read as midnight UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| format!("failed to parse '{raw}' as an RFC 3339 timestamp or YYYY-MM-DD"))
}

pub(crate) fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_timestamp(&value).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_with_offsets() {
        let instant = parse_timestamp("2025-09-24T12:00:00+02:00").expect("parses");
        assert_eq!(
            instant,
            Utc.with_ymd_and_hms(2025, 9, 24, 10, 0, 0)
                .single()
                .expect("valid instant")
        );
    }

    #[test]
    fn parses_plain_dates_as_midnight_utc() {
        let instant = parse_timestamp(" 2025-09-30 ").expect("parses");
        assert_eq!(instant.timestamp() % 86_400, 0);
        assert_eq!(instant.date_naive().to_string(), "2025-09-30");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("not-a-date").is_err());
    }
}
