use argoq::models::{Aggregation, Intent, QueryType, json_schema};
use serde_json::json;

fn decode(value: serde_json::Value) -> Intent {
    serde_json::from_value(value).expect("intent should decode")
}

#[test]
fn camel_case_document_decodes() {
    let intent = decode(json!({
        "queryType": "Proximity",
        "metrics": ["temperature", "salinity"],
        "latitude": 13.08,
        "longitude": 80.27,
        "distanceKm": 250,
        "timeConstraint": "last 6 months",
        "limit": 4
    }));

    assert_eq!(intent.query_type, QueryType::Proximity);
    assert_eq!(intent.metrics, vec!["temperature", "salinity"]);
    assert_eq!(intent.distance_km, Some(250.0));
    assert_eq!(intent.time_constraint.as_deref(), Some("last 6 months"));
    assert_eq!(intent.effective_limit(), Some(4));
}

#[test]
fn snake_case_keys_are_accepted() {
    let intent = decode(json!({
        "query_type": "Time-Series",
        "float_id": 2902115,
        "location_name": "Arabian Sea",
        "location_clause": "\"latitude\" BETWEEN 5 AND 22",
        "distance_km": 100.5
    }));

    assert_eq!(intent.query_type, QueryType::TimeSeries);
    assert_eq!(intent.float_id, Some(2_902_115));
    assert_eq!(intent.location_name.as_deref(), Some("Arabian Sea"));
    assert!(intent.location_clause.is_some());
    assert_eq!(intent.distance_km, Some(100.5));
}

#[test]
fn unknown_or_missing_query_type_routes_to_general() {
    assert_eq!(decode(json!({})).query_type, QueryType::General);
    assert_eq!(decode(json!({"queryType": null})).query_type, QueryType::General);
    assert_eq!(decode(json!({"queryType": "Heatmap"})).query_type, QueryType::General);
    assert_eq!(decode(json!({"queryType": "timeseries"})).query_type, QueryType::TimeSeries);
}

#[test]
fn aggregation_is_lenient() {
    assert_eq!(decode(json!({})).aggregation, Aggregation::Avg);
    assert_eq!(decode(json!({"aggregation": "COUNT"})).aggregation, Aggregation::Count);
    assert_eq!(decode(json!({"aggregation": "median"})).aggregation, Aggregation::Avg);
}

#[test]
fn float_id_accepts_numeric_strings() {
    assert_eq!(decode(json!({"floatId": "2902115"})).float_id, Some(2_902_115));
    assert_eq!(decode(json!({"floatId": ""})).float_id, None);
    assert_eq!(decode(json!({"floatId": null})).float_id, None);

    let err = serde_json::from_value::<Intent>(json!({"floatId": "abc"}))
        .expect_err("non-numeric float id must fail");
    assert!(err.to_string().contains("floatId"), "unexpected error: {err}");
}

#[test]
fn null_metrics_is_an_empty_list() {
    assert!(decode(json!({"metrics": null})).metrics.is_empty());
}

#[test]
fn zero_limit_means_archetype_default() {
    let intent = decode(json!({"queryType": "General", "limit": 0}));
    assert_eq!(intent.limit, Some(0));
    assert_eq!(intent.effective_limit(), None);
}

#[test]
fn schema_describes_the_intent_document() {
    let schema = json_schema();
    let properties = schema
        .get("properties")
        .and_then(serde_json::Value::as_object)
        .expect("schema should list properties");

    for key in ["queryType", "metrics", "floatId", "distanceKm", "locationClause"] {
        assert!(properties.contains_key(key), "missing property {key}");
    }
}
