// services/console-dash/src/format.rs
//
// Display formatting shared by the panels.
//

use chrono::{DateTime, Local, TimeZone};

pub const MISSING: &str = "—";

pub fn km(v: Option<f64>) -> String {
    v.map_or_else(|| MISSING.to_string(), |v| format!("{:.2} km", v))
}

pub fn mins(v: Option<f64>) -> String {
    v.map_or_else(|| MISSING.to_string(), |v| format!("{:.0} min", v.round()))
}

pub fn kg(v: Option<f64>) -> String {
    v.map_or_else(|| MISSING.to_string(), |v| format!("{:.2} kg", v))
}

/// ISO-8601 timestamp rendered in local time.
pub fn dt(iso: Option<&str>) -> String {
    iso.and_then(parse_iso)
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

/// Percentage as the backend sends it (already scaled to 0-100).
pub fn pct(v: f64) -> String {
    format!("{}%", v)
}

/// Probability in 0..1 rendered as a rounded percentage.
pub fn probability(p: f64) -> String {
    format!("{}%", (p * 100.0).round() as i64)
}

pub fn risk_label(p: Option<f64>) -> Option<&'static str> {
    let p = p?;
    Some(if p > 0.6 {
        "High"
    } else if p > 0.3 {
        "Medium"
    } else {
        "Low"
    })
}

/// Wall-clock label for a delay-trend point.
pub fn clock_label<Tz: TimeZone>(at: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%H:%M:%S").to_string()
}

fn parse_iso(raw: &str) -> Option<DateTime<Local>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Local));
    }
    // Naive timestamps from the backend are UTC.
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().with_timezone(&Local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_route_units() {
        assert_eq!(km(Some(120.0)), "120.00 km");
        assert_eq!(mins(Some(90.0)), "90 min");
        assert_eq!(kg(Some(30.0)), "30.00 kg");
        assert_eq!(km(None), MISSING);
    }

    #[test]
    fn test_minutes_round_half_up() {
        assert_eq!(mins(Some(2.5)), "3 min");
        assert_eq!(mins(Some(90.5)), "91 min");
        assert_eq!(mins(Some(0.5)), "1 min");
        assert_eq!(mins(Some(90.4)), "90 min");
    }

    #[test]
    fn test_probability_and_risk() {
        assert_eq!(probability(0.42), "42%");
        assert_eq!(risk_label(Some(0.42)), Some("Medium"));
        assert_eq!(risk_label(Some(0.61)), Some("High"));
        assert_eq!(risk_label(Some(0.3)), Some("Low"));
        assert_eq!(risk_label(None), None);
    }

    #[test]
    fn test_dt_handles_offsets_and_naive() {
        let expected = Utc
            .with_ymd_and_hms(2025, 3, 1, 10, 0, 0)
            .unwrap()
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        assert_eq!(dt(Some("2025-03-01T10:00:00Z")), expected);
        assert_eq!(dt(Some("2025-03-01T10:00:00.123456")), expected);
        assert_eq!(dt(Some("yesterday")), MISSING);
        assert_eq!(dt(None), MISSING);
    }

    #[test]
    fn test_clock_label() {
        let at = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 1, 9, 5, 7)
            .unwrap();
        assert_eq!(clock_label(at), "09:05:07");
    }

    #[test]
    fn test_pct_keeps_backend_precision() {
        assert_eq!(pct(45.0), "45%");
        assert_eq!(pct(-12.5), "-12.5%");
    }
}
