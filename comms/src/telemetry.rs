//! Detection result telemetry line.
//!
//! A validated detection goes over the link as a single framed text line:
//!
//! ```text
//! $x y z dphase0 dphase1 dphase2 dphase3 energy#
//! ```
//!
//! followed by `\n\r`, with all eight fields in six-decimal fixed point.
//! [`parse_detection`] is the topside direction, recovering a
//! [`DetectionResult`] from a received line.

use detection::DetectionResult;
use thiserror::Error;

/// Errors from parsing a received telemetry line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TelemetryError {
    #[error("telemetry line is not framed by '$' and '#'")]
    MissingFrame,

    #[error("expected 8 fields, got {0}")]
    FieldCount(usize),

    #[error("unparseable field {field:?}")]
    BadNumber { field: String },
}

/// Format a detection as the framed wire line.
pub fn format_detection(result: &DetectionResult) -> String {
    let [x, y, z] = result.bearing;
    let [d0, d1, d2, d3] = result.phase_deltas;
    format!(
        "${x:.6} {y:.6} {z:.6} {d0:.6} {d1:.6} {d2:.6} {d3:.6} {e:.6}#\n\r",
        e = result.tone_energy
    )
}

/// Parse a received telemetry line back into a [`DetectionResult`].
///
/// Tolerates surrounding whitespace and the trailing line ending.
pub fn parse_detection(line: &str) -> Result<DetectionResult, TelemetryError> {
    let body = line
        .trim()
        .strip_prefix('$')
        .and_then(|s| s.strip_suffix('#'))
        .ok_or(TelemetryError::MissingFrame)?;

    let fields: Vec<&str> = body.split_whitespace().collect();
    if fields.len() != 8 {
        return Err(TelemetryError::FieldCount(fields.len()));
    }

    let mut values = [0.0f32; 8];
    for (value, field) in values.iter_mut().zip(&fields) {
        *value = field.parse().map_err(|_| TelemetryError::BadNumber {
            field: (*field).to_owned(),
        })?;
    }

    Ok(DetectionResult {
        bearing: [values[0], values[1], values[2]],
        phase_deltas: [values[3], values[4], values[5], values[6]],
        tone_energy: values[7],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample_result() -> DetectionResult {
        DetectionResult {
            bearing: [0.25, -0.5, 0.829156],
            phase_deltas: [0.1, -0.2, 0.3, -0.2],
            tone_energy: 770.0625,
        }
    }

    #[test]
    fn test_wire_format() {
        let line = format_detection(&sample_result());
        assert_eq!(
            line,
            "$0.250000 -0.500000 0.829156 0.100000 -0.200000 0.300000 -0.200000 770.062500#\n\r"
        );
    }

    #[test]
    fn test_round_trip() {
        let original = sample_result();
        let parsed = parse_detection(&format_detection(&original)).unwrap();
        for (a, b) in parsed.bearing.iter().zip(original.bearing) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-6);
        }
        for (a, b) in parsed.phase_deltas.iter().zip(original.phase_deltas) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(parsed.tone_energy, original.tone_energy, epsilon = 1e-3);
    }

    #[test]
    fn test_parse_rejects_unframed_line() {
        assert_eq!(
            parse_detection("0.1 0.2 0.3 0 0 0 0 1"),
            Err(TelemetryError::MissingFrame)
        );
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        assert_eq!(
            parse_detection("$0.1 0.2 0.3#"),
            Err(TelemetryError::FieldCount(3))
        );
    }

    #[test]
    fn test_parse_rejects_bad_number() {
        let err = parse_detection("$0.1 0.2 0.3 a 0 0 0 1#").unwrap_err();
        assert!(matches!(err, TelemetryError::BadNumber { .. }));
    }
}
