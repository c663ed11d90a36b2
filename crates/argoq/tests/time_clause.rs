use argoq::time_clause::{TimeClauseResolver, TimePredicate};
use time::Month;
use time::macros::date;

fn resolver() -> TimeClauseResolver {
    TimeClauseResolver::new(date!(2024 - 06 - 30))
}

#[test]
fn absent_or_unrecognized_expressions_match_everything() {
    for expression in [None, Some(""), Some("   "), Some("recently"), Some("last summer")] {
        let predicate = resolver().resolve(expression);
        assert!(predicate.is_all(), "{expression:?} resolved to {predicate:?}");
        assert_eq!(predicate.to_sql(), "1=1");
    }
}

#[test]
fn last_six_months_spans_180_days_back_from_the_anchor() {
    let predicate = resolver().resolve(Some("Floats active in the LAST 6 MONTHS"));
    assert_eq!(
        predicate,
        TimePredicate::Range {
            start: date!(2024 - 01 - 02),
            end: date!(2024 - 06 - 30)
        }
    );
    assert_eq!(
        predicate.to_sql(),
        "\"timestamp\" >= '2024-01-02' AND \"timestamp\" < '2024-07-01'"
    );
}

#[test]
fn relative_window_never_starts_before_the_oldest_data() {
    let predicate = resolver()
        .with_floor(Some(date!(2024 - 04 - 15)))
        .resolve(Some("last 6 months"));
    assert_eq!(
        predicate,
        TimePredicate::Range {
            start: date!(2024 - 04 - 15),
            end: date!(2024 - 06 - 30)
        }
    );
}

#[test]
fn floor_after_the_anchor_is_ignored() {
    let predicate = resolver()
        .with_floor(Some(date!(2025 - 01 - 01)))
        .resolve(Some("last 6 months"));
    assert_eq!(
        predicate,
        TimePredicate::Range {
            start: date!(2024 - 01 - 02),
            end: date!(2024 - 06 - 30)
        }
    );
}

#[test]
fn bare_year_covers_exactly_that_calendar_year() {
    let predicate = resolver().resolve(Some("profiles from 2021"));
    assert_eq!(predicate, TimePredicate::Year(2021));
    assert!(predicate.covers(date!(2021 - 01 - 01)));
    assert!(predicate.covers(date!(2021 - 12 - 31)));
    assert!(!predicate.covers(date!(2020 - 12 - 31)));
    assert!(!predicate.covers(date!(2022 - 01 - 01)));
    assert_eq!(
        predicate.to_sql(),
        "\"timestamp\" >= '2021-01-01' AND \"timestamp\" < '2022-01-01'"
    );
}

#[test]
fn year_with_month_abbreviation_is_an_equality_pair() {
    let predicate = resolver().resolve(Some("oct 2023"));
    assert_eq!(
        predicate,
        TimePredicate::YearMonth {
            year: 2023,
            month: Month::October
        }
    );
    assert_eq!(
        predicate.to_sql(),
        "EXTRACT(YEAR FROM \"timestamp\") = 2023 AND EXTRACT(MONTH FROM \"timestamp\") = 10"
    );
}

#[test]
fn relative_phrase_wins_over_a_year() {
    let predicate = resolver().resolve(Some("last 6 months of 2022"));
    assert!(
        matches!(predicate, TimePredicate::Range { .. }),
        "unexpected predicate: {predicate:?}"
    );
}

#[test]
fn month_without_year_is_not_recognized() {
    assert!(resolver().resolve(Some("in March")).is_all());
}
