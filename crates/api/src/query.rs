//! Query-string parameter types shared by handlers.

use serde::Deserialize;
use spice_core::error::CoreError;
use spice_core::filter::{split_list, FilterSpec};

/// Restaurant search parameters.
///
/// `cuisine` and `location` are comma-separated lists. `day`, `time` and
/// `sort` are parsed case-insensitively.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
    pub cuisine: Option<String>,
    pub location: Option<String>,
    pub day: Option<String>,
    pub time: Option<String>,
    pub min_price: Option<i32>,
    pub max_price: Option<i32>,
    pub min_rating: Option<f64>,
    pub sort: Option<String>,
}

impl SearchParams {
    pub fn into_filter(self) -> Result<FilterSpec, CoreError> {
        Ok(FilterSpec {
            name: self.name,
            cuisines: split_list(self.cuisine.as_deref()),
            locations: split_list(self.location.as_deref()),
            day: parse_blank_as_none(self.day.as_deref())?,
            time_slot: parse_blank_as_none(self.time.as_deref())?,
            min_price: self.min_price,
            max_price: self.max_price,
            min_rating: self.min_rating,
            sort: parse_blank_as_none(self.sort.as_deref())?.unwrap_or_default(),
        })
    }
}

fn parse_blank_as_none<T>(raw: Option<&str>) -> Result<Option<T>, CoreError>
where
    T: std::str::FromStr<Err = CoreError>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

/// `?fields=cuisine,day`. Omitted or empty means every field.
#[derive(Debug, Deserialize)]
pub struct FieldsParams {
    pub fields: Option<String>,
}

/// `?author=NAME`.
#[derive(Debug, Deserialize)]
pub struct AuthorParams {
    #[serde(default)]
    pub author: String,
}

/// `?force=true`.
#[derive(Debug, Deserialize)]
pub struct SyncParams {
    #[serde(default)]
    pub force: bool,
}
