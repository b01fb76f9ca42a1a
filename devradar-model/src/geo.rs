use crate::error::{ModelError, Result};

use std::fmt;

/// A single point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Builds a coordinate pair, rejecting values off the globe.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ModelError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ModelError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

/// The rectangular map viewport: a center plus the visible span on each axis.
///
/// Only the latest value matters; callers replace it wholesale on every pan or
/// zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoRegion {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub latitude_span: f64,
    pub longitude_span: f64,
}

impl GeoRegion {
    pub fn new(
        center_latitude: f64,
        center_longitude: f64,
        latitude_span: f64,
        longitude_span: f64,
    ) -> Self {
        Self {
            center_latitude,
            center_longitude,
            latitude_span,
            longitude_span,
        }
    }

    /// Region centered on `center` with the given spans.
    pub fn around(
        center: Coordinates,
        latitude_span: f64,
        longitude_span: f64,
    ) -> Result<Self> {
        let valid = |span: f64| span.is_finite() && span > 0.0;
        if !valid(latitude_span) || !valid(longitude_span) {
            return Err(ModelError::InvalidSpan {
                latitude: latitude_span,
                longitude: longitude_span,
            });
        }
        Ok(Self::new(
            center.latitude,
            center.longitude,
            latitude_span,
            longitude_span,
        ))
    }

    pub fn center(&self) -> Coordinates {
        Coordinates {
            latitude: self.center_latitude,
            longitude: self.center_longitude,
        }
    }

    /// Whether `point` falls inside the visible rectangle. Edges count as inside.
    pub fn contains(&self, point: Coordinates) -> bool {
        let half_lat = self.latitude_span / 2.0;
        let half_lon = self.longitude_span / 2.0;
        (point.latitude - self.center_latitude).abs() <= half_lat
            && (point.longitude - self.center_longitude).abs() <= half_lon
    }
}

impl fmt::Display for GeoRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (span {:.3} x {:.3})",
            self.center(),
            self.latitude_span,
            self.longitude_span
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_points_off_the_globe() {
        assert_eq!(
            Coordinates::new(91.0, 0.0),
            Err(ModelError::InvalidLatitude(91.0))
        );
        assert_eq!(
            Coordinates::new(0.0, -180.5),
            Err(ModelError::InvalidLongitude(-180.5))
        );
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn around_keeps_the_fix_as_center() {
        let center = Coordinates::new(10.0, 20.0).unwrap();
        let region = GeoRegion::around(center, 0.04, 0.04).unwrap();
        assert_eq!(region, GeoRegion::new(10.0, 20.0, 0.04, 0.04));
        assert_eq!(region.center(), center);
    }

    #[test]
    fn around_rejects_degenerate_spans() {
        let center = Coordinates::new(0.0, 0.0).unwrap();
        assert!(GeoRegion::around(center, 0.0, 0.04).is_err());
        assert!(GeoRegion::around(center, 0.04, f64::INFINITY).is_err());
        assert!(GeoRegion::around(center, 0.1, 0.2).is_ok());
    }

    #[test]
    fn contains_checks_both_axes() {
        let region = GeoRegion::new(10.0, 20.0, 0.04, 0.04);
        assert!(region.contains(Coordinates {
            latitude: 10.01,
            longitude: 19.99
        }));
        assert!(!region.contains(Coordinates {
            latitude: 10.05,
            longitude: 20.0
        }));
        assert!(!region.contains(Coordinates {
            latitude: 10.0,
            longitude: 20.03
        }));
    }
}
