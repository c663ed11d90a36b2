use argoq::catalog::ColumnSet;
use argoq::compiler::{CompileError, compile};
use argoq::geo::CoordinateAxis;
use argoq::models::{DbContext, Intent, QueryType};
use time::macros::date;

fn near_chennai() -> Intent {
    Intent {
        latitude: Some(13.08),
        longitude: Some(80.27),
        distance_km: Some(500.0),
        limit: Some(4),
        ..Intent::new(QueryType::Proximity)
    }
}

fn context() -> DbContext {
    DbContext::default().with_max_known_date(date!(2024 - 06 - 30))
}

#[test]
fn nearest_floats_keep_latest_sample_per_float() {
    let sql = compile(&near_chennai(), &context()).expect("proximity intent should compile");
    let sql = sql.as_str();

    assert!(sql.starts_with("WITH time_filtered AS ("), "unexpected sql: {sql}");
    assert!(
        sql.contains(
            "ROW_NUMBER() OVER (PARTITION BY \"float_id\" ORDER BY \"timestamp\" DESC) AS ts_rank"
        ),
        "missing per-float ranking: {sql}"
    );
    assert!(sql.contains("WHERE ts_rank = 1"), "missing rank filter: {sql}");
    assert!(sql.contains("WHERE distance_km <= 500\n"), "missing radius cut: {sql}");
    assert!(sql.contains("ORDER BY distance_km ASC"), "missing ordering: {sql}");
    assert!(sql.ends_with("LIMIT 4;"), "missing limit: {sql}");
}

#[test]
fn bounding_box_is_at_least_eight_degrees() {
    let sql = compile(&near_chennai(), &context()).expect("proximity intent should compile");

    assert!(
        sql.as_str().contains(
            "\"latitude\" BETWEEN 5.0800 AND 21.0800 AND \"longitude\" BETWEEN 72.2700 AND 88.2700"
        ),
        "unexpected bounding box: {sql}"
    );
}

#[test]
fn distance_expression_clamps_the_acos_argument() {
    let sql = compile(&near_chennai(), &context()).expect("proximity intent should compile");
    let sql = sql.as_str();

    assert!(
        sql.contains("ROUND((6371 * acos(LEAST(1.0, GREATEST(-1.0, cos(radians(13.08::float))"),
        "unexpected distance expression: {sql}"
    );
    assert!(sql.contains("radians(80.27::float)"), "origin longitude missing: {sql}");
}

#[test]
fn no_time_constraint_adds_no_time_predicate() {
    let sql = compile(&near_chennai(), &context()).expect("proximity intent should compile");
    assert!(!sql.as_str().contains("\"timestamp\" >="), "unexpected time filter: {sql}");
}

#[test]
fn relative_window_is_anchored_on_newest_data_and_clamped_to_oldest() {
    let intent = Intent {
        time_constraint: Some("in the last 6 months".to_string()),
        ..near_chennai()
    };

    let anchored = compile(&intent, &context()).expect("proximity intent should compile");
    assert!(
        anchored
            .as_str()
            .contains("\"timestamp\" >= '2024-01-02' AND \"timestamp\" < '2024-07-01'"),
        "unexpected window: {anchored}"
    );

    let clamped = compile(&intent, &context().with_min_known_date(date!(2024 - 03 - 01)))
        .expect("proximity intent should compile");
    assert!(
        clamped.as_str().contains("\"timestamp\" >= '2024-03-01'"),
        "window should start at the oldest known date: {clamped}"
    );
}

#[test]
fn metrics_are_rounded_and_filtered_by_schema() {
    let intent = Intent {
        metrics: vec![
            "temperature".to_string(),
            "latitude".to_string(),
            "salinity".to_string(),
        ],
        ..near_chennai()
    };
    let ctx = DbContext::new(ColumnSet::from_names([
        "float_id",
        "timestamp",
        "latitude",
        "longitude",
        "pressure",
        "temperature",
    ]))
    .with_max_known_date(date!(2024 - 06 - 30));

    let sql = compile(&intent, &ctx).expect("proximity intent should compile");
    let sql = sql.as_str();
    assert!(
        sql.contains("ROUND(NULLIF(\"temperature\", 'NaN')::numeric, 3) AS \"temperature\""),
        "temperature should be rounded: {sql}"
    );
    assert!(
        sql.contains("ROUND(\"latitude\"::numeric, 4) AS \"latitude\""),
        "latitude should be rounded once: {sql}"
    );
    assert!(!sql.contains("salinity"), "absent column leaked: {sql}");
}

#[test]
fn named_place_supplies_the_origin() {
    let intent = Intent {
        location_name: Some("Chennai".to_string()),
        ..Intent::new(QueryType::Proximity)
    };
    let sql = compile(&intent, &context()).expect("known place should compile");
    let sql = sql.as_str();

    assert!(sql.contains("radians(13.08::float)"), "chennai latitude missing: {sql}");
    assert!(sql.ends_with("LIMIT 5;"), "default limit should be 5: {sql}");
}

#[test]
fn antimeridian_box_wraps_longitude() {
    let intent = Intent {
        latitude: Some(0.0),
        longitude: Some(175.0),
        ..Intent::new(QueryType::Proximity)
    };
    let sql = compile(&intent, &context()).expect("pacific intent should compile");

    assert!(
        sql.as_str().contains(
            "\"latitude\" BETWEEN -8.0000 AND 8.0000 AND (\"longitude\" >= 167.0000 OR \"longitude\" <= -177.0000)"
        ),
        "unexpected wrapped box: {sql}"
    );
}

#[test]
fn out_of_range_coordinates_are_rejected() {
    let latitude = Intent {
        latitude: Some(95.0),
        ..near_chennai()
    };
    assert_eq!(
        compile(&latitude, &context()),
        Err(CompileError::InvalidCoordinate {
            axis: CoordinateAxis::Latitude,
            value: 95.0
        })
    );

    let longitude = Intent {
        longitude: Some(200.0),
        ..near_chennai()
    };
    let err = compile(&longitude, &context()).expect_err("longitude 200 must fail");
    assert_eq!(err.code(), "invalid_coordinate");
    assert!(
        err.to_string().contains("between -180 and 180"),
        "unexpected message: {err}"
    );
}

#[test]
fn unknown_place_reports_missing_location() {
    let intent = Intent {
        location_name: Some("atlantis".to_string()),
        ..Intent::new(QueryType::Proximity)
    };
    assert_eq!(
        compile(&intent, &context()),
        Err(CompileError::MissingLocation {
            location_name: Some("atlantis".to_string())
        })
    );
}
