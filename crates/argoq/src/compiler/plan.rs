//! Closed set of query archetypes, each carrying only what its builder needs.
//!
//! Every structural and validation failure is raised while planning, so a
//! plan that exists always renders to query text.

use super::CompileError;
use super::guard::LocationClause;
use crate::geo::GeoPoint;
use crate::location;
use crate::models::{Aggregation, Intent, QueryType};
use crate::time_clause;

pub const DEFAULT_DISTANCE_KM: f64 = 500.0;
pub const DEFAULT_PROXIMITY_LIMIT: u32 = 5;
pub const DEFAULT_TIME_SERIES_LIMIT: u32 = 365;
pub const SCATTER_ROW_CAP: u32 = 1000;
pub const GENERAL_ROW_CAP: u32 = 500;

/// Location and time filters shared by the window-style archetypes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub location: Option<LocationClause>,
    pub time_constraint: Option<String>,
}

impl Scope {
    /// True when the scope narrows the rows at all. A tautological clause or
    /// an unrecognized time phrase does not.
    #[must_use]
    pub fn constrains(&self) -> bool {
        self.location.is_some() || time_clause::is_recognized(self.time_constraint.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProximityRequest {
    pub origin: GeoPoint,
    pub distance_km: f64,
    pub metrics: Vec<String>,
    pub time_constraint: Option<String>,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSeriesRequest {
    pub metrics: Vec<String>,
    pub scope: Scope,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticRequest {
    pub metrics: Vec<String>,
    pub aggregation: Aggregation,
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRequest {
    pub float_id: Option<i64>,
    pub metrics: Vec<String>,
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrajectoryRequest {
    pub float_id: i64,
    pub metrics: Vec<String>,
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScatterRequest {
    pub metrics: Vec<String>,
    pub scope: Scope,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRequest {
    pub float_id: Option<i64>,
    pub metrics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralRequest {
    pub scope: Scope,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Archetype {
    Proximity(ProximityRequest),
    TimeSeries(TimeSeriesRequest),
    Statistic(StatisticRequest),
    Profile(ProfileRequest),
    Trajectory(TrajectoryRequest),
    Scatter(ScatterRequest),
    Path(PathRequest),
    General(GeneralRequest),
}

impl Archetype {
    pub fn from_intent(intent: &Intent) -> Result<Self, CompileError> {
        let scope = Scope {
            location: intent
                .location_clause
                .as_deref()
                .map(LocationClause::parse)
                .transpose()?
                .flatten(),
            time_constraint: intent.time_constraint.clone(),
        };
        let metrics = intent.metrics.clone();
        let limit = intent.effective_limit();

        let archetype = match intent.query_type {
            QueryType::Proximity => Self::Proximity(ProximityRequest {
                origin: proximity_origin(intent)?,
                distance_km: search_radius(intent.distance_km)?,
                metrics,
                time_constraint: scope.time_constraint,
                limit: limit.unwrap_or(DEFAULT_PROXIMITY_LIMIT),
            }),
            QueryType::TimeSeries => Self::TimeSeries(TimeSeriesRequest {
                metrics,
                scope,
                limit: limit.unwrap_or(DEFAULT_TIME_SERIES_LIMIT),
            }),
            QueryType::Statistic => Self::Statistic(StatisticRequest {
                metrics,
                aggregation: intent.aggregation,
                scope,
            }),
            QueryType::Profile => {
                if intent.float_id.is_none() && !scope.constrains() {
                    return Err(CompileError::InvalidRequest(
                        "profile query requires a floatId, a location or a time constraint"
                            .to_string(),
                    ));
                }
                Self::Profile(ProfileRequest {
                    float_id: intent.float_id,
                    metrics,
                    scope,
                })
            }
            QueryType::Trajectory => {
                let Some(float_id) = intent.float_id else {
                    return Err(CompileError::InvalidRequest(
                        "trajectory query requires a floatId".to_string(),
                    ));
                };
                Self::Trajectory(TrajectoryRequest {
                    float_id,
                    metrics,
                    scope,
                })
            }
            QueryType::Scatter => Self::Scatter(ScatterRequest {
                metrics,
                scope,
                limit: limit.map_or(SCATTER_ROW_CAP, |limit| limit.min(SCATTER_ROW_CAP)),
            }),
            QueryType::Path => Self::Path(PathRequest {
                float_id: intent.float_id,
                metrics,
            }),
            QueryType::General => Self::General(GeneralRequest {
                scope,
                limit: limit.map_or(GENERAL_ROW_CAP, |limit| limit.min(GENERAL_ROW_CAP)),
            }),
        };
        Ok(archetype)
    }

    #[must_use]
    pub const fn query_type(&self) -> QueryType {
        match self {
            Self::Proximity(_) => QueryType::Proximity,
            Self::TimeSeries(_) => QueryType::TimeSeries,
            Self::Statistic(_) => QueryType::Statistic,
            Self::Profile(_) => QueryType::Profile,
            Self::Trajectory(_) => QueryType::Trajectory,
            Self::Scatter(_) => QueryType::Scatter,
            Self::Path(_) => QueryType::Path,
            Self::General(_) => QueryType::General,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.query_type().as_str()
    }
}

/// Explicit coordinates win; the gazetteer is consulted only when both are
/// absent, and a half-specified pair is never completed from it.
fn proximity_origin(intent: &Intent) -> Result<GeoPoint, CompileError> {
    match (intent.latitude, intent.longitude) {
        (Some(latitude), Some(longitude)) => GeoPoint::new(latitude, longitude),
        (None, None) => {
            let missing = || CompileError::MissingLocation {
                location_name: intent.location_name.clone(),
            };
            let place = intent
                .location_name
                .as_deref()
                .and_then(location::resolve)
                .ok_or_else(missing)?;
            tracing::debug!(place = place.name, "resolved proximity origin from gazetteer");
            place.point().ok_or_else(missing)
        }
        _ => Err(CompileError::MissingLocation {
            location_name: intent.location_name.clone(),
        }),
    }
}

fn search_radius(distance_km: Option<f64>) -> Result<f64, CompileError> {
    let distance_km = distance_km.unwrap_or(DEFAULT_DISTANCE_KM);
    if distance_km.is_finite() && distance_km > 0.0 {
        Ok(distance_km)
    } else {
        Err(CompileError::InvalidRequest(format!(
            "distanceKm must be a positive number of kilometres, got {distance_km}"
        )))
    }
}
