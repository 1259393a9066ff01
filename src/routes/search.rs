use axum::extract::{Query, State};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::error::{ApiError, ApiResult};
use crate::services::search::{parse_kinds, search, SearchResult};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    /// Comma separated entity types
    #[serde(default)]
    pub types: Option<String>,
}

/// GET /search?q=&types=
pub async fn search_all(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Query(params): Query<SearchParams>,
) -> ApiResult<DataResponse<Vec<SearchResult>>> {
    let kinds = parse_kinds(params.types.as_deref())
        .map_err(|e| ApiError::invalid_field("types", e.to_string()))?;

    let results = search(state.store.as_ref(), auth.user_id, &params.q, &kinds).await?;
    Ok(DataResponse::new(results))
}
