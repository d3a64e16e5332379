use super::domain::{FenceId, GeoFence, LocationType};
use serde::Serialize;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle (haversine) distance between two coordinates, in meters.
pub fn distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Outcome of classifying a coordinate against a company's fences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedLocation {
    pub location_type: LocationType,
    pub nearest_fence: Option<FenceId>,
    pub distance_m: Option<f64>,
}

/// Classify a coordinate against the given fences.
///
/// A point inside a fence's radius takes that fence's type; overlapping
/// fences resolve to the first match in iteration order. A point outside
/// every fence but within `wfh_threshold_m` of the nearest one is treated as
/// working from home. Anything further is unknown, still carrying the
/// nearest fence and distance when any fence exists.
pub fn classify_location(
    latitude: f64,
    longitude: f64,
    fences: &[GeoFence],
    wfh_threshold_m: f64,
) -> ClassifiedLocation {
    let mut nearest: Option<(&GeoFence, f64)> = None;

    for fence in fences {
        let distance = distance_meters(latitude, longitude, fence.latitude, fence.longitude);
        if distance <= fence.radius_m {
            return ClassifiedLocation {
                location_type: fence.kind.location_type(),
                nearest_fence: Some(fence.id.clone()),
                distance_m: Some(distance),
            };
        }
        match nearest {
            Some((_, best)) if best <= distance => {}
            _ => nearest = Some((fence, distance)),
        }
    }

    match nearest {
        Some((fence, distance)) if distance <= wfh_threshold_m => ClassifiedLocation {
            location_type: LocationType::WorkFromHome,
            nearest_fence: Some(fence.id.clone()),
            distance_m: Some(distance),
        },
        Some((fence, distance)) => ClassifiedLocation {
            location_type: LocationType::Unknown,
            nearest_fence: Some(fence.id.clone()),
            distance_m: Some(distance),
        },
        None => ClassifiedLocation {
            location_type: LocationType::Unknown,
            nearest_fence: None,
            distance_m: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::domain::{CompanyId, FenceKind};

    fn fence(id: &str, lat: f64, lng: f64, radius_m: f64, kind: FenceKind) -> GeoFence {
        GeoFence {
            id: FenceId(id.to_string()),
            company_id: CompanyId("acme".to_string()),
            latitude: lat,
            longitude: lng,
            radius_m,
            kind,
            is_active: true,
        }
    }

    #[test]
    fn distance_is_symmetric_and_zero_for_identical_points() {
        let pairs = [
            (12.9716, 77.5946, 13.0827, 80.2707),
            (0.0, 0.0, 45.0, 90.0),
            (-33.8688, 151.2093, 51.5074, -0.1278),
        ];
        for (lat1, lng1, lat2, lng2) in pairs {
            let forward = distance_meters(lat1, lng1, lat2, lng2);
            let backward = distance_meters(lat2, lng2, lat1, lng1);
            assert!((forward - backward).abs() < 1e-6);
        }
        assert_eq!(distance_meters(12.9716, 77.5946, 12.9716, 77.5946), 0.0);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let distance = distance_meters(12.0, 77.0, 13.0, 77.0);
        assert!((distance - 111_195.0).abs() < 100.0, "got {distance}");
    }

    #[test]
    fn point_inside_fence_takes_fence_type() {
        let fences = vec![fence("hq", 12.9716, 77.5946, 200.0, FenceKind::Office)];
        let classified = classify_location(12.9716, 77.5946, &fences, 1_000.0);
        assert_eq!(classified.location_type, LocationType::Office);
        assert_eq!(classified.nearest_fence, Some(FenceId("hq".to_string())));
        assert_eq!(classified.distance_m, Some(0.0));
    }

    #[test]
    fn overlapping_fences_resolve_to_first_match() {
        let fences = vec![
            fence("site-a", 12.9716, 77.5946, 500.0, FenceKind::ClientSite),
            fence("hq", 12.9716, 77.5946, 500.0, FenceKind::Office),
        ];
        let classified = classify_location(12.9717, 77.5946, &fences, 1_000.0);
        assert_eq!(classified.location_type, LocationType::ClientSite);
        assert_eq!(classified.nearest_fence, Some(FenceId("site-a".to_string())));
    }

    #[test]
    fn near_miss_within_threshold_is_work_from_home() {
        // ~555 m north of a 200 m fence.
        let fences = vec![fence("hq", 12.9716, 77.5946, 200.0, FenceKind::Office)];
        let classified = classify_location(12.9766, 77.5946, &fences, 1_000.0);
        assert_eq!(classified.location_type, LocationType::WorkFromHome);
        assert_eq!(classified.nearest_fence, Some(FenceId("hq".to_string())));
    }

    #[test]
    fn far_point_is_unknown_but_keeps_nearest_fence() {
        let fences = vec![
            fence("hq", 12.9716, 77.5946, 200.0, FenceKind::Office),
            fence("site-b", 13.0827, 80.2707, 200.0, FenceKind::ClientSite),
        ];
        let classified = classify_location(12.99, 77.60, &fences, 500.0);
        assert_eq!(classified.location_type, LocationType::Unknown);
        assert_eq!(classified.nearest_fence, Some(FenceId("hq".to_string())));
        assert!(classified.distance_m.expect("distance present") > 500.0);
    }

    #[test]
    fn no_fences_yields_unknown_without_context() {
        let classified = classify_location(12.9716, 77.5946, &[], 1_000.0);
        assert_eq!(classified.location_type, LocationType::Unknown);
        assert_eq!(classified.nearest_fence, None);
        assert_eq!(classified.distance_m, None);
    }
}
