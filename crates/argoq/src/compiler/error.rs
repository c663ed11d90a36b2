use thiserror::Error;

use crate::geo::CoordinateAxis;

/// Structural or validation failure detected before any query text is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error(
        "proximity query requires coordinates or a known location; specify a location like \
         'Chennai' or 'Bay of Bengal', or provide both latitude and longitude"
    )]
    MissingLocation { location_name: Option<String> },

    #[error("invalid {axis} {value}; {}", .axis.range_hint())]
    InvalidCoordinate { axis: CoordinateAxis, value: f64 },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("location clause rejected: {reason}")]
    InvalidLocationClause { reason: String },
}

impl CompileError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingLocation { .. } => "missing_location",
            Self::InvalidCoordinate { .. } => "invalid_coordinate",
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidLocationClause { .. } => "invalid_location_clause",
        }
    }
}
