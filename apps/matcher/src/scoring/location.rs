//! Location Matcher: remote compatibility first, then great-circle distance
//! between externally geocoded coordinates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{MatchError, Result};
use crate::models::{GeoPoint, Location, LocationProfile};
use crate::scoring::normalize::normalize_token;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Kilometres of distance that cost one point.
    pub km_per_point: f64,
    /// Score when either side lacks coordinates and the labels don't settle it.
    pub ungeocoded_score: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            km_per_point: 10.0,
            ungeocoded_score: 50.0,
        }
    }
}

impl LocationConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.km_per_point.is_finite() || self.km_per_point <= 0.0 {
            return Err(MatchError::invalid(
                "location.km_per_point",
                format!("must be a positive number, got {}", self.km_per_point),
            ));
        }
        if !(0.0..=100.0).contains(&self.ungeocoded_score) {
            return Err(MatchError::invalid(
                "location.ungeocoded_score",
                format!("must be within [0, 100], got {}", self.ungeocoded_score),
            ));
        }
        Ok(())
    }
}

/// Great-circle distance in kilometres (haversine).
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

fn validate_point(field: &str, point: GeoPoint) -> Result<GeoPoint> {
    if !point.lat.is_finite() || !(-90.0..=90.0).contains(&point.lat) {
        return Err(MatchError::invalid(
            format!("{field}.lat"),
            format!("latitude must be within [-90, 90], got {}", point.lat),
        ));
    }
    if !point.lon.is_finite() || !(-180.0..=180.0).contains(&point.lon) {
        return Err(MatchError::invalid(
            format!("{field}.lon"),
            format!("longitude must be within [-180, 180], got {}", point.lon),
        ));
    }
    Ok(point)
}

/// Location sub-score on 0–100.
///
/// Remote-ok on either side wins outright, before coordinates are looked at.
/// Otherwise one point is lost per
/// `km_per_point` kilometres, floored at zero with no distance cap. Without
/// coordinates on both sides the score is the documented neutral default,
/// except that identical labels count as zero distance.
pub fn score_location(
    job_location: &Location,
    candidate_location: &Location,
    job_remote_ok: bool,
    candidate_remote_ok: bool,
    config: &LocationConfig,
) -> Result<f64> {
    if job_remote_ok || candidate_remote_ok {
        return Ok(100.0);
    }

    let job_point = job_location
        .coordinates
        .map(|p| validate_point("job_location", p))
        .transpose()?;
    let candidate_point = candidate_location
        .coordinates
        .map(|p| validate_point("candidate_location", p))
        .transpose()?;

    if let (Some(a), Some(b)) = (job_point, candidate_point) {
        let distance = haversine_km(a, b);
        return Ok((100.0 - distance / config.km_per_point).max(0.0));
    }

    let same_label = match (&job_location.label, &candidate_location.label) {
        (Some(j), Some(c)) => {
            let (j, c) = (normalize_token(j), normalize_token(c));
            !j.is_empty() && j == c
        }
        _ => false,
    };
    if same_label {
        return Ok(100.0);
    }

    debug!("Location not geocoded on both sides; using neutral location score");
    Ok(config.ungeocoded_score)
}

pub fn score_location_profile(profile: &LocationProfile, config: &LocationConfig) -> Result<f64> {
    score_location(
        &profile.job,
        &profile.candidate,
        profile.job_remote_ok,
        profile.candidate_remote_ok,
        config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BERLIN: (f64, f64) = (52.5200, 13.4050);
    const POTSDAM: (f64, f64) = (52.3906, 13.0645);
    const NEW_YORK: (f64, f64) = (40.7128, -74.0060);

    fn at(p: (f64, f64)) -> Location {
        Location::at(p.0, p.1)
    }

    #[test]
    fn test_remote_ok_overrides_distance() {
        let config = LocationConfig::default();
        let score = score_location(&at(BERLIN), &at(NEW_YORK), true, false, &config).unwrap();
        assert_eq!(score, 100.0);
        let score = score_location(&at(BERLIN), &at(NEW_YORK), false, true, &config).unwrap();
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_remote_ok_with_5000km_is_exactly_100() {
        // ~5000 km apart along the equator
        let a = Location::at(0.0, 0.0);
        let b = Location::at(0.0, 44.966);
        let distance = haversine_km(GeoPoint { lat: 0.0, lon: 0.0 }, GeoPoint { lat: 0.0, lon: 44.966 });
        assert!((distance - 5000.0).abs() < 5.0, "Distance was {distance}");
        let score = score_location(&a, &b, true, false, &LocationConfig::default()).unwrap();
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_nearby_cities_score_high() {
        let score =
            score_location(&at(BERLIN), &at(POTSDAM), false, false, &LocationConfig::default())
                .unwrap();
        // ~27 km → ~97
        assert!(score > 96.0 && score < 98.0, "Score was {score}");
    }

    #[test]
    fn test_far_cities_floor_at_zero() {
        let score =
            score_location(&at(BERLIN), &at(NEW_YORK), false, false, &LocationConfig::default())
                .unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_same_point_is_full() {
        let score =
            score_location(&at(BERLIN), &at(BERLIN), false, false, &LocationConfig::default())
                .unwrap();
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_missing_coordinates_is_neutral() {
        let score = score_location(
            &Location::labeled("Berlin"),
            &Location::default(),
            false,
            false,
            &LocationConfig::default(),
        )
        .unwrap();
        assert_eq!(score, 50.0);
    }

    #[test]
    fn test_identical_labels_without_coordinates_is_full() {
        let score = score_location(
            &Location::labeled("New York, NY"),
            &Location::labeled("new york,  ny"),
            false,
            false,
            &LocationConfig::default(),
        )
        .unwrap();
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_invalid_latitude_rejected() {
        let err = score_location(
            &Location::at(95.0, 0.0),
            &at(BERLIN),
            false,
            false,
            &LocationConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("job_location.lat"));
    }

    #[test]
    fn test_remote_ok_ignores_malformed_coordinates() {
        let config = LocationConfig::default();
        let score =
            score_location(&at(BERLIN), &Location::at(95.0, 0.0), true, false, &config).unwrap();
        assert_eq!(score, 100.0);
        let score =
            score_location(&Location::at(0.0, 500.0), &at(BERLIN), false, true, &config).unwrap();
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        let d = haversine_km(
            GeoPoint { lat: BERLIN.0, lon: BERLIN.1 },
            GeoPoint { lat: NEW_YORK.0, lon: NEW_YORK.1 },
        );
        assert!((d - 6385.0).abs() < 20.0, "Distance was {d}");
    }
}
