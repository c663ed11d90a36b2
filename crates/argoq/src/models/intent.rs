use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Query archetype requested by the intent producer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, JsonSchema)]
pub enum QueryType {
    Proximity,
    #[serde(rename = "Time-Series")]
    #[schemars(rename = "Time-Series")]
    TimeSeries,
    Statistic,
    Profile,
    Trajectory,
    Scatter,
    Path,
    #[default]
    General,
}

impl QueryType {
    /// Maps a producer tag onto the closed set. Tags are compared without
    /// case, `-`, `_` or spaces; anything unrecognized is `General`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let normalized = tag
            .chars()
            .filter(|ch| !matches!(ch, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "proximity" => Self::Proximity,
            "timeseries" => Self::TimeSeries,
            "statistic" => Self::Statistic,
            "profile" => Self::Profile,
            "trajectory" => Self::Trajectory,
            "scatter" => Self::Scatter,
            "path" => Self::Path,
            _ => Self::General,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Proximity => "Proximity",
            Self::TimeSeries => "Time-Series",
            Self::Statistic => "Statistic",
            Self::Profile => "Profile",
            Self::Trajectory => "Trajectory",
            Self::Scatter => "Scatter",
            Self::Path => "Path",
            Self::General => "General",
        }
    }
}

impl<'de> Deserialize<'de> for QueryType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(tag.as_deref().map_or(Self::General, Self::from_tag))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Avg,
    Sum,
    Min,
    Max,
    Count,
}

impl Aggregation {
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "sum" => Self::Sum,
            "min" => Self::Min,
            "max" => Self::Max,
            "count" => Self::Count,
            _ => Self::Avg,
        }
    }

    #[must_use]
    pub const fn sql_function(self) -> &'static str {
        match self {
            Self::Avg => "AVG",
            Self::Sum => "SUM",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Count => "COUNT",
        }
    }
}

impl<'de> Deserialize<'de> for Aggregation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(tag.as_deref().map_or(Self::Avg, Self::from_tag))
    }
}

/// Structured description of what the caller wants to know. Keys are accepted
/// in camelCase or snake_case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    #[serde(default, alias = "query_type")]
    pub query_type: QueryType,

    #[serde(default, deserialize_with = "nullable_metrics")]
    #[schemars(with = "Vec<String>")]
    pub metrics: Vec<String>,

    #[serde(
        default,
        alias = "float_id",
        deserialize_with = "lenient_float_id",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<i64>")]
    pub float_id: Option<i64>,

    #[serde(default, alias = "location_name", skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[serde(default, alias = "distance_km", skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,

    #[serde(default, alias = "time_constraint", skip_serializing_if = "Option::is_none")]
    pub time_constraint: Option<String>,

    #[serde(default)]
    pub aggregation: Aggregation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    #[serde(default, alias = "location_clause", skip_serializing_if = "Option::is_none")]
    pub location_clause: Option<String>,
}

impl Intent {
    #[must_use]
    pub fn new(query_type: QueryType) -> Self {
        Self {
            query_type,
            ..Self::default()
        }
    }

    /// `limit: 0` means "not given".
    #[must_use]
    pub fn effective_limit(&self) -> Option<u32> {
        self.limit.filter(|limit| *limit > 0)
    }
}

fn nullable_metrics<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn lenient_float_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_i64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("floatId must be an integer")),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => text
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("floatId is not numeric: {text}"))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "floatId must be a number or numeric string, got {other}"
        ))),
    }
}

#[must_use]
pub fn json_schema() -> Value {
    let schema = schemars::schema_for!(Intent);
    match serde_json::to_value(schema) {
        Ok(value) => value,
        Err(error) => {
            panic!("failed to serialize generated intent schema: {error}");
        }
    }
}
