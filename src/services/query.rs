//! List query helpers
//!
//! Shared building blocks for the filtered/paginated list endpoints:
//! - `Pagination` translates page/limit into offset/limit
//! - `DateWindow` turns calendar-date bounds into an inclusive/exclusive
//!   timestamp window
//! - `SortSpec` resolves client sort fields against a per-entity allow-list
//! - `ListFilter` builds a WHERE clause from independently-added predicates

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

/// Default page size for list endpoints
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Pagination parameters (1-based page)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Pagination {
    /// Create pagination parameters, clamping page to at least 1 and the
    /// limit to 1..=100.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, 100),
        }
    }

    /// Row offset for the current page
    pub fn offset(&self) -> i64 {
        ((self.page - 1) as i64) * self.limit as i64
    }

    /// Row limit for the current page
    pub fn limit(&self) -> i64 {
        self.limit as i64
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// SQL keyword for this direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Per-entity allow-list of sortable fields.
///
/// Client-supplied sort fields are matched against the list; unrecognized
/// values fall back to the default column instead of reaching the query
/// layer.
#[derive(Debug, Clone, Copy)]
pub struct SortSpec {
    allowed: &'static [(&'static str, &'static str)],
    default: &'static str,
}

impl SortSpec {
    /// Create a sort spec from (api-name, column) pairs and a default column
    pub const fn new(
        allowed: &'static [(&'static str, &'static str)],
        default: &'static str,
    ) -> Self {
        Self { allowed, default }
    }

    /// Resolve a requested sort field to a column, falling back to the
    /// default for unknown fields.
    pub fn resolve(&self, requested: Option<&str>) -> &'static str {
        requested
            .and_then(|name| {
                self.allowed
                    .iter()
                    .find(|(api, _)| *api == name)
                    .map(|(_, column)| *column)
            })
            .unwrap_or(self.default)
    }
}

/// Half-open timestamp window `[start, end)` derived from calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// Build a window from optional calendar-date bounds (`YYYY-MM-DD`).
    ///
    /// Both-or-neither semantics: when either bound is absent no window is
    /// produced, so a single-sided bound never filters. The lower bound is
    /// the start date's midnight (inclusive); the upper bound is the day
    /// after the end date's midnight (exclusive), so a same-day pair
    /// captures the whole day.
    pub fn from_bounds(start: Option<&str>, end: Option<&str>) -> Result<Option<Self>, String> {
        let (start, end) = match (start, end) {
            (Some(s), Some(e)) => (s, e),
            _ => return Ok(None),
        };

        let start_day = parse_date(start)?;
        let end_day = parse_date(end)?;

        Ok(Some(Self {
            start: midnight(start_day),
            end: midnight(end_day) + Duration::days(1),
        }))
    }

    /// Whether a timestamp falls inside the window
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", value))
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    // Midnight always exists for a valid calendar date
    Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).expect("valid midnight"))
}

/// A single named predicate in a list filter
#[derive(Debug, Clone)]
enum Predicate {
    /// Case-insensitive substring match on a text column
    Contains {
        column: &'static str,
        value: String,
    },
    /// Exact match on a foreign-key column
    EqualsId {
        column: &'static str,
        value: i64,
    },
    /// Exact match on a text column
    EqualsText {
        column: &'static str,
        value: String,
    },
    /// Timestamp column within a date window
    Within {
        column: &'static str,
        window: DateWindow,
    },
}

/// Explicit WHERE-clause builder.
///
/// Starts from a neutral (empty) filter and conditionally adds named
/// predicates; absent inputs add nothing. Column names are supplied by the
/// repositories, never by clients.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    predicates: Vec<Predicate>,
}

impl ListFilter {
    /// Create a neutral filter matching all rows
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a case-insensitive substring predicate when `value` is non-empty
    pub fn contains(mut self, column: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.predicates.push(Predicate::Contains {
                column,
                value: value.to_string(),
            });
        }
        self
    }

    /// Add an exact foreign-key predicate when `value` is present
    pub fn equals_id(mut self, column: &'static str, value: Option<i64>) -> Self {
        if let Some(value) = value {
            self.predicates.push(Predicate::EqualsId { column, value });
        }
        self
    }

    /// Add an exact text predicate when `value` is non-empty
    pub fn equals_text(mut self, column: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.predicates.push(Predicate::EqualsText {
                column,
                value: value.to_string(),
            });
        }
        self
    }

    /// Add a date-window predicate when a window is present
    pub fn within(mut self, column: &'static str, window: Option<DateWindow>) -> Self {
        if let Some(window) = window {
            self.predicates.push(Predicate::Within { column, window });
        }
        self
    }

    /// Whether any predicate was added
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Render the WHERE clause, empty when no predicate was added
    pub fn where_sql(&self) -> String {
        if self.predicates.is_empty() {
            return String::new();
        }

        let clauses: Vec<String> = self
            .predicates
            .iter()
            .map(|p| match p {
                Predicate::Contains { column, .. } => {
                    format!("LOWER({}) LIKE '%' || LOWER(?) || '%'", column)
                }
                Predicate::EqualsId { column, .. } => format!("{} = ?", column),
                Predicate::EqualsText { column, .. } => format!("{} = ?", column),
                Predicate::Within { column, .. } => {
                    format!("{col} >= ? AND {col} < ?", col = column)
                }
            })
            .collect();

        format!("WHERE {}", clauses.join(" AND "))
    }

    /// Bind predicate values in clause order
    pub fn bind<'q>(
        &'q self,
        mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        for predicate in &self.predicates {
            query = match predicate {
                Predicate::Contains { value, .. } => query.bind(value.as_str()),
                Predicate::EqualsId { value, .. } => query.bind(*value),
                Predicate::EqualsText { value, .. } => query.bind(value.as_str()),
                Predicate::Within { window, .. } => query.bind(window.start).bind(window.end),
            };
        }
        query
    }
}

/// Format a timestamp for human-readable envelope fields
pub fn format_readable(at: DateTime<Utc>) -> String {
    at.format("%d %B %Y at %H:%M").to_string()
}
