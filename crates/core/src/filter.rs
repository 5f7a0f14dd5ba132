//! Restaurant filter specification and filterable-field vocabulary.
//!
//! A [`FilterSpec`] is request-scoped: every provided field narrows the
//! result set (AND semantics) and absent or empty fields impose no
//! constraint. The store layer turns a normalized spec into a single query.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::restaurant::{TimeSlot, Weekday};
use crate::review::MAX_RATING;

/* --------------------------------------------------------------------------
Filterable fields
-------------------------------------------------------------------------- */

/// A field whose distinct values populate a selection widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Name,
    Cuisine,
    Location,
    Day,
    Time,
    Price,
}

impl FilterField {
    pub const ALL: [FilterField; 6] = [
        FilterField::Name,
        FilterField::Cuisine,
        FilterField::Location,
        FilterField::Day,
        FilterField::Time,
        FilterField::Price,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterField::Name => "name",
            FilterField::Cuisine => "cuisine",
            FilterField::Location => "location",
            FilterField::Day => "day",
            FilterField::Time => "time",
            FilterField::Price => "price",
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        FilterField::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown filter field '{trimmed}'. Must be one of: {}",
                    FilterField::ALL.map(FilterField::as_str).join(", ")
                ))
            })
    }
}

/// Parse a comma-separated field list. An empty list means "all fields".
pub fn parse_fields(raw: Option<&str>) -> Result<Vec<FilterField>, CoreError> {
    let fields = split_list(raw)
        .iter()
        .map(|s| s.parse())
        .collect::<Result<Vec<FilterField>, _>>()?;

    if fields.is_empty() {
        Ok(FilterField::ALL.to_vec())
    } else {
        Ok(fields)
    }
}

/// Split a comma-separated query-string value, trimming and dropping blanks.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/* --------------------------------------------------------------------------
Sorting
-------------------------------------------------------------------------- */

/// Requested result ordering. Without one, results are ordered by id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Id,
    /// Name ascending, case-insensitive.
    Name,
    /// Average rating descending; unrated restaurants last.
    Rating,
}

impl FromStr for SortKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(SortKey::Id),
            "name" => Ok(SortKey::Name),
            "rating" => Ok(SortKey::Rating),
            other => Err(CoreError::Validation(format!(
                "Invalid sort '{other}'. Must be one of: id, name, rating"
            ))),
        }
    }
}

/* --------------------------------------------------------------------------
Filter specification
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Case-insensitive substring of the restaurant name.
    pub name: Option<String>,
    /// Restaurant cuisine must be one of these.
    #[serde(default)]
    pub cuisines: Vec<String>,
    /// Restaurant location must be one of these.
    #[serde(default)]
    pub locations: Vec<String>,
    pub day: Option<Weekday>,
    pub time_slot: Option<TimeSlot>,
    /// Inclusive lower bound on an offering's price, in dollars.
    pub min_price: Option<i32>,
    /// Inclusive upper bound on an offering's price, in dollars.
    pub max_price: Option<i32>,
    /// Minimum average rating. Unrated restaurants never satisfy it.
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub sort: SortKey,
}

impl FilterSpec {
    /// Trim free-text fields and drop blanks so empty inputs impose no
    /// constraint.
    pub fn normalized(mut self) -> Self {
        self.name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        self.cuisines = normalize_set(self.cuisines);
        self.locations = normalize_set(self.locations);
        self
    }

    /// Reject contradictory or out-of-range bounds.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(CoreError::Validation(format!(
                    "min_price ({min}) must not exceed max_price ({max})"
                )));
            }
        }
        if self.min_price.is_some_and(|p| p < 0) || self.max_price.is_some_and(|p| p < 0) {
            return Err(CoreError::Validation(
                "Price bounds must not be negative".to_string(),
            ));
        }
        if let Some(rating) = self.min_rating {
            if !rating.is_finite() || rating < 0.0 || rating > f64::from(MAX_RATING) {
                return Err(CoreError::Validation(format!(
                    "min_rating must be between 0 and {MAX_RATING}"
                )));
            }
        }
        Ok(())
    }

    /// Whether any per-offering predicate (day, time slot, price) is set.
    ///
    /// All of them must hold on the same offering.
    pub fn constrains_offerings(&self) -> bool {
        self.day.is_some()
            || self.time_slot.is_some()
            || self.min_price.is_some()
            || self.max_price.is_some()
    }
}

fn normalize_set(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let trimmed = value.trim();
        if !trimmed.is_empty() && !out.iter().any(|v| v == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    out
}
