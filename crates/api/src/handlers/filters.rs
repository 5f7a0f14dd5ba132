use std::collections::BTreeMap;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use spice_core::filter::parse_fields;

use crate::error::AppResult;
use crate::query::FieldsParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/filters?fields=cuisine,day
///
/// Distinct values per filterable field, keyed by field name.
pub async fn distinct_values(
    State(state): State<AppState>,
    params: Result<Query<FieldsParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<BTreeMap<&'static str, Vec<String>>>>> {
    let Query(params) = params?;
    let fields = parse_fields(params.fields.as_deref())?;
    let values = state.query.distinct_values(&fields).await?;

    let data = values
        .into_iter()
        .map(|(field, values)| (field.as_str(), Vec::clone(&values)))
        .collect();
    Ok(Json(DataResponse { data }))
}
