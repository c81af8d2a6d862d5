//! NMEA GGA sentence decoding
//!
//! Field layout after splitting on commas:
//!
//! ```text
//! 0       1     2    3     4    5     6        7        8     9
//! $GPGGA, time, lat, N|S,  lon, E|W,  quality, numSats, hdop, altitude, ...
//! ```
//!
//! Checksums are not verified.

use super::Coordinate;

const FIELD_LAT: usize = 2;
const FIELD_LAT_DIR: usize = 3;
const FIELD_LON: usize = 4;
const FIELD_LON_DIR: usize = 5;
const FIELD_ALTITUDE: usize = 9;

/// Decode a GGA sentence, or `None` if the line is not one
///
/// Any two-character talker ID is accepted (`$GPGGA`, `$GNGGA`, `$GLGGA`).
pub(super) fn decode_gga(line: &str) -> Option<Coordinate> {
    let line = line.trim_start();
    if !is_gga(line) {
        return None;
    }

    let fields: Vec<&str> = line.split(',').collect();
    let field = |index: usize| fields.get(index).map(|f| f.trim()).unwrap_or("");

    let latitude = parse_angle(field(FIELD_LAT))
        .map(|value| apply_hemisphere(value, field(FIELD_LAT_DIR)));
    let longitude = parse_angle(field(FIELD_LON))
        .map(|value| apply_hemisphere(value, field(FIELD_LON_DIR)));
    let altitude = parse_plain(field(FIELD_ALTITUDE));

    Some(Coordinate {
        x: longitude,
        y: latitude,
        z: altitude,
    })
}

/// `$` + two-character talker + `GGA` + field separator
fn is_gga(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() >= 7
        && bytes[0] == b'$'
        && bytes[1].is_ascii_alphanumeric()
        && bytes[2].is_ascii_alphanumeric()
        && &bytes[3..6] == b"GGA"
        && bytes[6] == b','
}

/// Convert `DDMM.MMMM` / `DDDMM.MMMM` to decimal degrees
///
/// The two digits immediately before the decimal point start the minutes;
/// everything before them is whole degrees.
fn parse_angle(raw: &str) -> Option<f64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }

    let point = raw.find('.').unwrap_or(raw.len());
    if point < 2 {
        return None;
    }

    let (degrees, minutes) = raw.split_at(point - 2);
    let degrees = if degrees.is_empty() {
        0.0
    } else {
        degrees.parse::<f64>().ok()?
    };
    let minutes = minutes.parse::<f64>().ok()?;

    Some(degrees + minutes / 60.0)
}

fn apply_hemisphere(value: f64, hemisphere: &str) -> f64 {
    match hemisphere {
        "S" | "W" => -value,
        _ => value,
    }
}

fn parse_plain(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_gga() {
        assert!(is_gga("$GPGGA,"));
        assert!(is_gga("$GNGGA,1,2"));
        assert!(!is_gga("$GPRMC,123519,A"));
        assert!(!is_gga("GPGGA,123519"));
        assert!(!is_gga("$GPGGA"));
    }

    #[test]
    fn test_parse_angle() {
        let lat = parse_angle("4807.038").unwrap();
        assert!((lat - 48.1173).abs() < 1e-4);

        let lon = parse_angle("01131.000").unwrap();
        assert!((lon - 11.516_666).abs() < 1e-4);

        // Minutes only
        let small = parse_angle("07.5").unwrap();
        assert!((small - 0.125).abs() < 1e-9);

        // No fractional part
        let whole = parse_angle("4830").unwrap();
        assert!((whole - 48.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_angle_rejects_malformed() {
        assert_eq!(parse_angle(""), None);
        assert_eq!(parse_angle("7.5"), None);
        assert_eq!(parse_angle("48a7.038"), None);
        assert_eq!(parse_angle("-4807.038"), None);
        assert_eq!(parse_angle("4807.03.8"), None);
    }

    #[test]
    fn test_empty_latitude_marks_axis_absent() {
        let c = decode_gga("$GPGGA,123519,,N,01131.000,E,1,08,0.9,545.4,M").unwrap();
        assert_eq!(c.y, None);
        assert!(c.x.is_some());
        assert_eq!(c.z, Some(545.4));
    }

    #[test]
    fn test_leading_whitespace_tolerated() {
        let c = decode_gga("  $GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M").unwrap();
        assert!(c.is_complete());
    }

    #[test]
    fn test_non_gga_returns_none() {
        assert_eq!(decode_gga("$GPRMC,123519,A,4807.038,N"), None);
        assert_eq!(decode_gga("1,2,3"), None);
    }

    #[test]
    fn test_garbled_altitude() {
        let c = decode_gga("$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,5x5.4,M").unwrap();
        assert_eq!(c.z, None);
    }
}
