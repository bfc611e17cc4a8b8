//! Geodistance
//!
//! Great-circle distances on a spherical earth, used to rank listings by proximity to a
//! buyer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean earth radius used by the haversine approximation.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Errors raised when constructing [`Coordinates`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinatesError {
    /// Latitude is not a finite value in `[-90, 90]`.
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),

    /// Longitude is not a finite value in `[-180, 180]`.
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
}

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates", into = "RawCoordinates")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Build a coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns an error when either component is not finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinatesError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinatesError::Latitude(latitude));
        }

        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinatesError::Longitude(longitude));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Distance to `other` in whole meters.
    pub fn distance_to(&self, other: &Self) -> u64 {
        distance_meters(self, other)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = CoordinatesError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl From<Coordinates> for RawCoordinates {
    fn from(coordinates: Coordinates) -> Self {
        Self {
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
        }
    }
}

/// Haversine distance between two points, rounded to whole meters.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the rounded distance is non-negative and bounded by half the earth's circumference"
)]
pub fn distance_meters(from: &Coordinates, to: &Coordinates) -> u64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let half_dlat = (to.latitude - from.latitude).to_radians() / 2.0;
    let half_dlon = (to.longitude - from.longitude).to_radians() / 2.0;

    let a = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());

    (EARTH_RADIUS_METERS * c).round() as u64
}
