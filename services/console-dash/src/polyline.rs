// services/console-dash/src/polyline.rs
//
// Encoded polyline format (precision 5), as returned by OSRM.

use svckit::types::Coord;

const PRECISION: f64 = 1e5;

/// Decode into coordinates. Returns `None` on truncated or malformed input.
pub fn decode(encoded: &str) -> Option<Vec<Coord>> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let (mut lat, mut lon) = (0i64, 0i64);
    let mut points = Vec::new();

    while index < bytes.len() {
        lat = lat.checked_add(next_value(bytes, &mut index)?)?;
        lon = lon.checked_add(next_value(bytes, &mut index)?)?;
        points.push(Coord {
            lat: lat as f64 / PRECISION,
            lon: lon as f64 / PRECISION,
        });
    }

    Some(points)
}

pub fn encode(points: &[Coord]) -> String {
    let mut out = String::new();
    let (mut prev_lat, mut prev_lon) = (0i64, 0i64);

    for point in points {
        let lat = (point.lat * PRECISION).round() as i64;
        let lon = (point.lon * PRECISION).round() as i64;
        push_value(&mut out, lat - prev_lat);
        push_value(&mut out, lon - prev_lon);
        prev_lat = lat;
        prev_lon = lon;
    }

    out
}

fn next_value(bytes: &[u8], index: &mut usize) -> Option<i64> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes.get(*index)?;
        *index += 1;
        if !(63..=126).contains(&byte) || shift > 60 {
            return None;
        }
        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }

    Some(if result & 1 != 0 { !(result >> 1) } else { result >> 1 })
}

fn push_value(out: &mut String, value: i64) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };
    while v >= 0x20 {
        out.push((((v & 0x1f) | 0x20) as u8 + 63) as char);
        v >>= 5;
    }
    out.push((v as u8 + 63) as char);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_reference_line() {
        // Canonical example from the format description
        let points = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], Coord { lat: 38.5, lon: -120.2 });
        assert_eq!(points[1], Coord { lat: 40.7, lon: -120.95 });
        assert_eq!(points[2], Coord { lat: 43.252, lon: -126.453 });
    }

    #[test]
    fn test_encode_reference_line() {
        let points = [
            Coord { lat: 38.5, lon: -120.2 },
            Coord { lat: 40.7, lon: -120.95 },
            Coord { lat: 43.252, lon: -126.453 },
        ];
        assert_eq!(encode(&points), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    }

    #[test]
    fn test_truncated_input_rejected() {
        assert!(decode("_p~iF~ps|U_").is_none());
        assert!(decode("_p~iF").is_none());
        assert_eq!(decode(""), Some(vec![]));
    }

    #[test]
    fn test_overflowing_input_rejected() {
        // Each group decodes to -2^59; twenty of them overflow the latitude sum.
        assert!(decode(&"~~~~~~~~~~~~?".repeat(40)).is_none());
    }
}
