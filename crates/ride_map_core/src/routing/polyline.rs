//! Decoder for the encoded polyline format used by Google's `overview_polyline`.

use crate::error::DirectionsError;
use crate::geo::GeoPoint;

const PRECISION: f64 = 1e5;

/// Decode an encoded polyline (precision 5) into points.
pub fn decode_polyline(encoded: &str) -> Result<Vec<GeoPoint>, DirectionsError> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut points = Vec::new();

    while index < bytes.len() {
        lat += next_delta(bytes, &mut index)?;
        lng += next_delta(bytes, &mut index)?;
        let point = GeoPoint::new(lat as f64 / PRECISION, lng as f64 / PRECISION)
            .map_err(|err| DirectionsError::Decode(err.to_string()))?;
        points.push(point);
    }

    Ok(points)
}

fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64, DirectionsError> {
    let mut result: i64 = 0;
    let mut shift = 0;
    loop {
        let byte = *bytes
            .get(*index)
            .ok_or_else(|| DirectionsError::Decode("truncated polyline".to_string()))?;
        *index += 1;
        if !(63..=126).contains(&byte) {
            return Err(DirectionsError::Decode(format!(
                "invalid polyline character {:?}",
                byte as char
            )));
        }
        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
        if shift > 60 {
            return Err(DirectionsError::Decode("polyline value overflow".to_string()));
        }
    }
    Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_reference_polyline() {
        // Example from the format documentation.
        let points = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@").expect("decode");
        let expected = [(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];
        assert_eq!(points.len(), expected.len());
        for (point, (lat, lng)) in points.iter().zip(expected) {
            assert!((point.latitude() - lat).abs() < 1e-9);
            assert!((point.longitude() - lng).abs() < 1e-9);
        }
    }

    #[test]
    fn empty_input_is_empty_route() {
        assert!(decode_polyline("").expect("decode").is_empty());
    }

    #[test]
    fn truncated_input_is_an_error() {
        assert!(matches!(
            decode_polyline("_p~iF"),
            Err(DirectionsError::Decode(_))
        ));
    }
}
