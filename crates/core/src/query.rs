//! Translate search-form input into a catalog search request.

use chrono::{Months, NaiveDate};

use crate::error::ValidationError;
use crate::models::{SearchRequest, SortBy, SortDirection, SORT_FIELD};

/// Page size requested from the catalog.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Bounding box shown in a fresh form.
pub const DEFAULT_BBOX: &str = "10.0, 45.0, 12.0, 47.0";

/// Raw user input of the search form.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchForm {
    pub collections: Vec<String>,
    /// Comma separated `west, south, east, north`.
    pub bbox: String,
    /// `YYYY-MM-DD`, empty for an open start.
    pub start_date: String,
    /// `YYYY-MM-DD`, empty for an open end.
    pub end_date: String,
    pub sort: SortDirection,
    pub limit: u32,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            collections: Vec::new(),
            bbox: DEFAULT_BBOX.to_string(),
            start_date: String::new(),
            end_date: String::new(),
            sort: SortDirection::Desc,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl SearchForm {
    /// A form covering the year up to `today`.
    pub fn with_default_dates(today: NaiveDate) -> Self {
        let (start, end) = default_dates(today);
        Self {
            start_date: start.format("%Y-%m-%d").to_string(),
            end_date: end.format("%Y-%m-%d").to_string(),
            ..Self::default()
        }
    }

    pub fn collections<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collections = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn bbox(mut self, text: &str) -> Self {
        self.bbox = text.to_string();
        self
    }

    pub fn dates(mut self, start: &str, end: &str) -> Self {
        self.start_date = start.to_string();
        self.end_date = end.to_string();
        self
    }

    pub fn sort(mut self, direction: SortDirection) -> Self {
        self.sort = direction;
        self
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.limit = n;
        self
    }

    /// Validate the form and produce the `POST /search` body.
    pub fn build(&self) -> Result<SearchRequest, ValidationError> {
        build(
            &self.collections,
            &self.bbox,
            &self.start_date,
            &self.end_date,
            self.sort,
            self.limit,
        )
    }
}

/// Validate inputs and assemble a search request.
pub fn build(
    collections: &[String],
    bbox: &str,
    start_date: &str,
    end_date: &str,
    sort: SortDirection,
    limit: u32,
) -> Result<SearchRequest, ValidationError> {
    if collections.is_empty() {
        return Err(ValidationError::NoCollectionsSelected);
    }
    let bbox = parse_bbox(bbox)?;
    let datetime = datetime_interval(start_date, end_date)?;

    Ok(SearchRequest {
        collections: collections.to_vec(),
        bbox,
        datetime,
        limit,
        sortby: vec![SortBy {
            field: SORT_FIELD.to_string(),
            direction: sort,
        }],
        token: None,
    })
}

/// Parse `"w, s, e, n"` into exactly four finite numbers.
pub fn parse_bbox(text: &str) -> Result<[f64; 4], ValidationError> {
    let values = text
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|_| ValidationError::InvalidBoundingBox(text.to_string()))?;

    match values.as_slice() {
        &[w, s, e, n] if values.iter().all(|v| v.is_finite()) => Ok([w, s, e, n]),
        _ => Err(ValidationError::InvalidBoundingBox(text.to_string())),
    }
}

/// Expand two calendar dates to a `start/end` UTC interval.
///
/// The start expands to 00:00:00 and the end to 23:59:59. An empty side
/// becomes the open bound `..`.
pub fn datetime_interval(start_date: &str, end_date: &str) -> Result<String, ValidationError> {
    let start = parse_date(start_date)?;
    let end = parse_date(end_date)?;

    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(ValidationError::InvertedDateRange);
        }
    }

    let start = start
        .map(|d| format!("{}T00:00:00Z", d.format("%Y-%m-%d")))
        .unwrap_or_else(|| "..".to_string());
    let end = end
        .map(|d| format!("{}T23:59:59Z", d.format("%Y-%m-%d")))
        .unwrap_or_else(|| "..".to_string());
    Ok(format!("{start}/{end}"))
}

fn parse_date(text: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate(text.to_string()))
}

/// `(today - 1 year, today)`.
pub fn default_dates(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.checked_sub_months(Months::new(12)).unwrap_or(today);
    (start, today)
}
