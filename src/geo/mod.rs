//! Distance math and display formatting for GPS coordinates.
//!
//! Everything here is pure: no storage, no clocks, no I/O.

/// Great-circle distance between two coordinates using the haversine formula.
///
/// Returns whole meters; sub-meter precision is below GPS accuracy anyway.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS: f64 = 6_371_000.0; // meters

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    (EARTH_RADIUS * c).round()
}

/// Whether a measured distance falls inside a detection radius.
///
/// The boundary counts as inside.
pub fn within_radius(distance_m: f64, radius_m: f64) -> bool {
    distance_m <= radius_m
}

/// Format a distance for display: meters below 1 km, kilometers with one
/// decimal above.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", meters.round() as i64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// Human-readable guidance for the remaining distance to a target.
///
/// Tiers get more specific as the player closes in.
pub fn navigation_message(meters: f64) -> String {
    let whole = meters.round() as i64;

    if meters < 10.0 {
        "You are very close! Look around you.".to_string()
    } else if meters < 50.0 {
        format!("Only {} meters to go!", whole)
    } else if meters < 100.0 {
        format!("Almost there, {} meters left.", whole)
    } else if meters < 500.0 {
        format!("Still {} to go.", format_distance(meters))
    } else if meters < 1000.0 {
        format!("{} from the target.", format_distance(meters))
    } else {
        format!("You are still {} from the target.", format_distance(meters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_zero_for_same_point() {
        let d = distance_meters(-6.175392, 106.827153, -6.175392, 106.827153);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let a = distance_meters(-6.175392, 106.827153, -6.121435, 106.774124);
        let b = distance_meters(-6.121435, 106.774124, -6.175392, 106.827153);
        assert_eq!(a, b);
    }

    #[test]
    fn test_distance_known_pair() {
        // Paris (Notre-Dame) to London (Big Ben), roughly 340 km.
        let d = distance_meters(48.8530, 2.3499, 51.5007, -0.1246);
        assert!((d - 340_800.0).abs() < 2_000.0, "got {}", d);
    }

    #[test]
    fn test_distance_short_hop() {
        // Two points ~111 m apart along a meridian (0.001 degrees latitude).
        let d = distance_meters(0.0, 0.0, 0.001, 0.0);
        assert!((d - 111.0).abs() <= 1.0, "got {}", d);
    }

    #[test]
    fn test_within_radius_boundary() {
        assert!(within_radius(50.0, 50.0));
        assert!(within_radius(0.0, 50.0));
        assert!(!within_radius(50.1, 50.0));
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(45.0), "45 m");
        assert_eq!(format_distance(999.0), "999 m");
        assert_eq!(format_distance(1000.0), "1.0 km");
        assert_eq!(format_distance(2345.0), "2.3 km");
    }

    #[test]
    fn test_navigation_message_tiers() {
        assert!(navigation_message(5.0).contains("very close"));
        assert_eq!(navigation_message(30.0), "Only 30 meters to go!");
        assert_eq!(navigation_message(75.0), "Almost there, 75 meters left.");
        assert_eq!(navigation_message(300.0), "Still 300 m to go.");
        assert_eq!(navigation_message(800.0), "800 m from the target.");
        assert_eq!(
            navigation_message(2500.0),
            "You are still 2.5 km from the target."
        );
    }
}
