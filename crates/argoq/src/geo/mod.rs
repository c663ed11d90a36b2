//! Great-circle distance and bounding-box pre-filter rendering.

use std::fmt::{Display, Formatter};

use crate::compiler::CompileError;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const KM_PER_DEGREE: f64 = 111.0;
pub const MIN_BOX_HALF_WIDTH_DEG: f64 = 8.0;
pub const BOX_WIDENING_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateAxis {
    Latitude,
    Longitude,
}

impl CoordinateAxis {
    #[must_use]
    pub const fn limit(self) -> f64 {
        match self {
            Self::Latitude => 90.0,
            Self::Longitude => 180.0,
        }
    }

    #[must_use]
    pub fn range_hint(self) -> String {
        format!(
            "{self} must be between -{limit} and {limit} degrees",
            limit = self.limit()
        )
    }
}

impl Display for CoordinateAxis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latitude => f.write_str("latitude"),
            Self::Longitude => f.write_str("longitude"),
        }
    }
}

/// A validated point on the Earth's surface, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CompileError> {
        check_axis(CoordinateAxis::Latitude, latitude)?;
        check_axis(CoordinateAxis::Longitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

fn check_axis(axis: CoordinateAxis, value: f64) -> Result<(), CompileError> {
    if value.is_finite() && value.abs() <= axis.limit() {
        Ok(())
    } else {
        Err(CompileError::InvalidCoordinate { axis, value })
    }
}

/// Half-width in degrees applied on each axis for a search radius.
#[must_use]
pub fn box_half_width_deg(distance_km: f64) -> f64 {
    MIN_BOX_HALF_WIDTH_DEG.max(distance_km / KM_PER_DEGREE * BOX_WIDENING_FACTOR)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LongitudeSpan {
    /// No longitude constraint: the box touches a pole or spans the globe.
    Any,
    Range { min: f64, max: f64 },
    /// Crosses the antimeridian: `longitude >= east_of OR longitude <= west_of`.
    Wrapped { east_of: f64, west_of: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub longitude: LongitudeSpan,
}

impl BoundingBox {
    #[must_use]
    pub fn around(origin: GeoPoint, distance_km: f64) -> Self {
        let half_width = box_half_width_deg(distance_km);
        let min_latitude = (origin.latitude - half_width).max(-90.0);
        let max_latitude = (origin.latitude + half_width).min(90.0);

        let touches_pole = min_latitude <= -90.0 || max_latitude >= 90.0;
        let longitude = if touches_pole || half_width >= 180.0 {
            LongitudeSpan::Any
        } else {
            let min = origin.longitude - half_width;
            let max = origin.longitude + half_width;
            if min < -180.0 {
                LongitudeSpan::Wrapped {
                    east_of: min + 360.0,
                    west_of: max,
                }
            } else if max > 180.0 {
                LongitudeSpan::Wrapped {
                    east_of: min,
                    west_of: max - 360.0,
                }
            } else {
                LongitudeSpan::Range { min, max }
            }
        };

        Self {
            min_latitude,
            max_latitude,
            longitude,
        }
    }

    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        let latitude_ok =
            self.min_latitude <= point.latitude && point.latitude <= self.max_latitude;
        let longitude_ok = match self.longitude {
            LongitudeSpan::Any => true,
            LongitudeSpan::Range { min, max } => min <= point.longitude && point.longitude <= max,
            LongitudeSpan::Wrapped { east_of, west_of } => {
                point.longitude >= east_of || point.longitude <= west_of
            }
        };
        latitude_ok && longitude_ok
    }

    #[must_use]
    pub fn to_sql(&self) -> String {
        let latitude = format!(
            "\"latitude\" BETWEEN {:.4} AND {:.4}",
            self.min_latitude, self.max_latitude
        );
        match self.longitude {
            LongitudeSpan::Any => latitude,
            LongitudeSpan::Range { min, max } => {
                format!("{latitude} AND \"longitude\" BETWEEN {min:.4} AND {max:.4}")
            }
            LongitudeSpan::Wrapped { east_of, west_of } => format!(
                "{latitude} AND (\"longitude\" >= {east_of:.4} OR \"longitude\" <= {west_of:.4})"
            ),
        }
    }
}

/// Spherical law of cosines in kilometres, rounded to 2 places. The `acos`
/// argument is clamped to [-1, 1] so identical or antipodal points cannot
/// produce NaN through rounding overshoot.
#[must_use]
pub fn distance_expr(origin: GeoPoint) -> String {
    let lat = origin.latitude;
    let lon = origin.longitude;
    format!(
        "ROUND(({EARTH_RADIUS_KM} * acos(LEAST(1.0, GREATEST(-1.0, \
         cos(radians({lat}::float)) * cos(radians(\"latitude\"::float)) \
         * cos(radians(\"longitude\"::float) - radians({lon}::float)) \
         + sin(radians({lat}::float)) * sin(radians(\"latitude\"::float))))))::numeric, 2)"
    )
}

/// Same formula evaluated in Rust; used to reason about the pre-filter.
#[must_use]
pub fn great_circle_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let (lat1, lon1) = (from.latitude.to_radians(), from.longitude.to_radians());
    let (lat2, lon2) = (to.latitude.to_radians(), to.longitude.to_radians());
    let cosine = lat1.cos() * lat2.cos() * (lon2 - lon1).cos() + lat1.sin() * lat2.sin();
    EARTH_RADIUS_KM * cosine.clamp(-1.0, 1.0).acos()
}
