//! Coordinate decoding for telemetry lines
//!
//! Two line formats reach the relay:
//!
//! | Format | Example | Axes |
//! |--------|---------|------|
//! | NMEA GGA | `$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,...` | lon → x, lat → y, altitude → z |
//! | Triplet | `10.5, -3.2, 7.0` (may be embedded in other text) | in order |
//!
//! Decoding never fails. A line that matches neither format, or whose
//! fields are missing, yields a [`Coordinate`] with absent axes. Whether a
//! coordinate is usable is the consumer's call; see [`Coordinate::fix`].

mod nmea;
mod triplet;

/// A decoded position where each axis may be absent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coordinate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

/// A position with all three axes present
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Outcome of decoding one line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decoded {
    /// All three axes decoded
    Valid(Fix),
    /// Recognized format, but at least one axis is missing
    Partial(Coordinate),
    /// Neither a GGA sentence nor a numeric triplet
    Unrecognized,
}

impl Coordinate {
    /// Coordinate with every axis absent
    pub const ABSENT: Coordinate = Coordinate {
        x: None,
        y: None,
        z: None,
    };

    /// Returns the fix only when all three axes are present
    pub fn fix(&self) -> Option<Fix> {
        match (self.x, self.y, self.z) {
            (Some(x), Some(y), Some(z)) => Some(Fix { x, y, z }),
            _ => None,
        }
    }

    /// True when all three axes are present
    pub fn is_complete(&self) -> bool {
        self.fix().is_some()
    }

    /// True when no axis is present
    pub fn is_absent(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }
}

impl From<Fix> for Coordinate {
    fn from(fix: Fix) -> Self {
        Coordinate {
            x: Some(fix.x),
            y: Some(fix.y),
            z: Some(fix.z),
        }
    }
}

/// Decode one line into a coordinate
///
/// GGA sentences are tried first; anything else is scanned for three
/// comma-separated numbers. A GGA sentence that cannot be fully decoded
/// keeps whatever axes it did yield and is not re-read as a triplet.
pub fn decode(line: &str) -> Coordinate {
    match classify(line) {
        Decoded::Valid(fix) => fix.into(),
        Decoded::Partial(coordinate) => coordinate,
        Decoded::Unrecognized => Coordinate::ABSENT,
    }
}

/// Decode one line and classify the result
///
/// A GGA sentence is never `Unrecognized`, even with every field empty.
pub fn classify(line: &str) -> Decoded {
    let coordinate = match nmea::decode_gga(line) {
        Some(coordinate) => coordinate,
        None => match triplet::find_triplet(line) {
            Some(coordinate) => coordinate,
            None => return Decoded::Unrecognized,
        },
    };

    match coordinate.fix() {
        Some(fix) => Decoded::Valid(fix),
        None => Decoded::Partial(coordinate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-4;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("axis should be present");
        assert!(
            (actual - expected).abs() < TOLERANCE,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_reference_gga_sentence() {
        let c = decode("$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,");
        assert_close(c.x, 11.516_666);
        assert_close(c.y, 48.1173);
        assert_eq!(c.z, Some(545.4));
    }

    #[test]
    fn test_reference_triplet() {
        let c = decode("10.5, -3.2, 7.0 noise");
        assert_eq!(c.x, Some(10.5));
        assert_eq!(c.y, Some(-3.2));
        assert_eq!(c.z, Some(7.0));
    }

    #[test]
    fn test_garbage_is_absent() {
        assert_eq!(decode("garbage line"), Coordinate::ABSENT);
        assert_eq!(decode(""), Coordinate::ABSENT);
        assert_eq!(classify("garbage line"), Decoded::Unrecognized);
    }

    #[test]
    fn test_hemisphere_signs() {
        let c = decode("$GPGGA,123519,4807.038,S,01131.000,W,1,08,0.9,545.4,M,46.9,M,,");
        assert!(c.x.unwrap() < 0.0);
        assert!(c.y.unwrap() < 0.0);
        assert_close(c.x, -11.516_666);
        assert_close(c.y, -48.1173);

        let c = decode("$GPGGA,123519,4807.038,N,01131.000,W,1,08,0.9,545.4,M,46.9,M,,");
        assert!(c.x.unwrap() < 0.0);
        assert!(c.y.unwrap() > 0.0);
    }

    #[test]
    fn test_missing_altitude_is_partial() {
        let line = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,,M,46.9,M,,";
        let c = decode(line);
        assert!(c.x.is_some());
        assert!(c.y.is_some());
        assert_eq!(c.z, None);
        assert!(matches!(classify(line), Decoded::Partial(_)));
    }

    #[test]
    fn test_truncated_gga_is_not_reread_as_triplet() {
        // "1,08,0.9" would match the triplet pattern if the sentence fell through
        let c = decode("$GPGGA,123519,,,,,1,08,0.9");
        assert_eq!(c, Coordinate::ABSENT);
    }

    #[test]
    fn test_gga_without_fix_is_partial() {
        // What a receiver sends before its first fix
        let line = "$GPGGA,123519,,,,,0,00,,,M,,M,,*66";
        assert_eq!(classify(line), Decoded::Partial(Coordinate::ABSENT));
        assert_eq!(decode(line), Coordinate::ABSENT);
    }

    #[test]
    fn test_valid_classification() {
        match classify("$GNGGA,092750.000,5321.6802,N,00630.3372,W,1,8,1.03,61.7,M,55.2,M,,*76") {
            Decoded::Valid(fix) => {
                assert!((fix.y - 53.361_336).abs() < TOLERANCE);
                assert!((fix.x + 6.505_62).abs() < TOLERANCE);
                assert_eq!(fix.z, 61.7);
            }
            other => panic!("expected valid fix, got {other:?}"),
        }
    }

    #[test]
    fn test_fix_requires_all_axes() {
        let partial = Coordinate {
            x: Some(1.0),
            y: Some(2.0),
            z: None,
        };
        assert_eq!(partial.fix(), None);
        assert!(!partial.is_complete());
        assert!(!partial.is_absent());

        let full = Coordinate::from(Fix {
            x: 1.0,
            y: 2.0,
            z: 3.0,
        });
        assert!(full.is_complete());
    }
}
