//! JSON parser for the SDIP vehicle feed.

use crate::model::VehicleRecord;

/// Decodes the feed body, a JSON array of vehicle objects.
///
/// # Errors
///
/// Returns an error if the bytes are not a JSON array of objects.
pub fn parse_vehicles(bytes: &[u8]) -> serde_json::Result<Vec<VehicleRecord>> {
    serde_json::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_array() {
        let vehicles = parse_vehicles(b"[]").unwrap();
        assert!(vehicles.is_empty());
    }

    #[test]
    fn test_parse_invalid_bytes() {
        let invalid_bytes = vec![0xFF, 0xFE, 0x00, 0x01];
        assert!(parse_vehicles(&invalid_bytes).is_err());
    }

    #[test]
    fn test_parse_object_instead_of_array() {
        assert!(parse_vehicles(br#"{"lineId": "6"}"#).is_err());
    }

    #[test]
    fn test_parse_minimal_feed() {
        let body = br#"[
            {"lineId": "6", "lineLabel": "6", "trip": "6/01", "id": "101_2"},
            {"lineId": 669, "lineLabel": "669", "trip": "3/02", "id": "7_40", "lat": 50.26}
        ]"#;
        let vehicles = parse_vehicles(body).unwrap();

        assert_eq!(vehicles.len(), 2);
        assert_eq!(vehicles[1].line(), "669");
        assert_eq!(vehicles[1].id, "7_40");
    }
}
