//! Free-text time expressions to timestamp predicates.
//!
//! Recognition is table driven: relative phrases first, then a 4-digit year
//! with an optional month. Everything else resolves to [`TimePredicate::All`]
//! so callers never see a parse failure for unrecognized phrasing.

use std::sync::OnceLock;

use regex::Regex;
use time::{Date, Duration, Month};

use crate::utils::time::format_sql_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeWindow {
    pub phrase: &'static str,
    pub days: i64,
}

pub const RELATIVE_WINDOWS: &[RelativeWindow] = &[RelativeWindow {
    phrase: "last 6 months",
    days: 180,
}];

pub const MONTH_ABBREVIATIONS: [(&str, Month); 12] = [
    ("jan", Month::January),
    ("feb", Month::February),
    ("mar", Month::March),
    ("apr", Month::April),
    ("may", Month::May),
    ("jun", Month::June),
    ("jul", Month::July),
    ("aug", Month::August),
    ("sep", Month::September),
    ("oct", Month::October),
    ("nov", Month::November),
    ("dec", Month::December),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePredicate {
    All,
    /// Inclusive on both calendar days.
    Range { start: Date, end: Date },
    Year(i32),
    YearMonth { year: i32, month: Month },
}

impl TimePredicate {
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Renders against the quoted `"timestamp"` column. Whole-day ranges are
    /// half-open on the following midnight so samples taken late on the last
    /// day are kept.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::All => "1=1".to_string(),
            Self::Range { start, end } => match end.next_day() {
                Some(after_end) => format!(
                    "\"timestamp\" >= '{}' AND \"timestamp\" < '{}'",
                    format_sql_date(*start),
                    format_sql_date(after_end)
                ),
                None => format!(
                    "\"timestamp\" BETWEEN '{}' AND '{}'",
                    format_sql_date(*start),
                    format_sql_date(*end)
                ),
            },
            Self::Year(year) => format!(
                "\"timestamp\" >= '{year:04}-01-01' AND \"timestamp\" < '{:04}-01-01'",
                year + 1
            ),
            Self::YearMonth { year, month } => format!(
                "EXTRACT(YEAR FROM \"timestamp\") = {year} AND EXTRACT(MONTH FROM \"timestamp\") = {}",
                u8::from(*month)
            ),
        }
    }

    #[must_use]
    pub fn covers(&self, date: Date) -> bool {
        match self {
            Self::All => true,
            Self::Range { start, end } => *start <= date && date <= *end,
            Self::Year(year) => date.year() == *year,
            Self::YearMonth { year, month } => date.year() == *year && date.month() == *month,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeClauseResolver {
    anchor: Date,
    floor: Option<Date>,
}

impl TimeClauseResolver {
    #[must_use]
    pub const fn new(anchor: Date) -> Self {
        Self {
            anchor,
            floor: None,
        }
    }

    /// Earliest date known to hold data; relative ranges never start before it.
    #[must_use]
    pub const fn with_floor(mut self, floor: Option<Date>) -> Self {
        self.floor = floor;
        self
    }

    #[must_use]
    pub const fn anchor(&self) -> Date {
        self.anchor
    }

    #[must_use]
    pub fn resolve(&self, expression: Option<&str>) -> TimePredicate {
        let Some(text) = expression.map(str::trim).filter(|text| !text.is_empty()) else {
            return TimePredicate::All;
        };

        let lowered = text.to_lowercase();
        if let Some(window) = RELATIVE_WINDOWS
            .iter()
            .find(|window| lowered.contains(window.phrase))
        {
            return self.relative_range(window.days);
        }

        let Some(year) = year_regex()
            .captures(text)
            .and_then(|captures| captures.get(1))
            .and_then(|found| found.as_str().parse::<i32>().ok())
        else {
            tracing::debug!(expression = text, "unrecognized time expression; matching all rows");
            return TimePredicate::All;
        };

        match month_in(text) {
            Some(month) => TimePredicate::YearMonth { year, month },
            None => TimePredicate::Year(year),
        }
    }

    fn relative_range(&self, days: i64) -> TimePredicate {
        let start = self
            .anchor
            .checked_sub(Duration::days(days))
            .unwrap_or(Date::MIN);
        let start = match self.floor {
            Some(floor) if floor > start && floor <= self.anchor => floor,
            _ => start,
        };

        TimePredicate::Range {
            start,
            end: self.anchor,
        }
    }
}

/// Whether an expression narrows the time window at all. Anchor independent.
#[must_use]
pub fn is_recognized(expression: Option<&str>) -> bool {
    let Some(text) = expression.map(str::trim).filter(|text| !text.is_empty()) else {
        return false;
    };
    let lowered = text.to_lowercase();
    RELATIVE_WINDOWS
        .iter()
        .any(|window| lowered.contains(window.phrase))
        || year_regex().is_match(text)
}

fn month_in(text: &str) -> Option<Month> {
    let abbreviation = month_regex()
        .captures(text)?
        .get(1)?
        .as_str()
        .get(..3)?
        .to_ascii_lowercase();
    MONTH_ABBREVIATIONS
        .iter()
        .find(|(name, _)| *name == abbreviation)
        .map(|(_, month)| *month)
}

fn year_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\b(20\d{2})\b").expect("year regex should compile"))
}

/// Full month names and their usual short forms only, so words such as
/// "marine" or "decline" are not months. "may" stays ambiguous.
fn month_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b",
        )
        .expect("month regex should compile")
    })
}
