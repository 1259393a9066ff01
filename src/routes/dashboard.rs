use axum::extract::State;
use chrono::Utc;
use std::sync::Arc;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::analytics::DashboardStats;
use crate::error::ApiResult;
use crate::services::analytics;

/// GET /dashboard/stats
pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
) -> ApiResult<DataResponse<DashboardStats>> {
    let stats =
        analytics::dashboard(state.store.as_ref(), auth.user_id, Utc::now().date_naive()).await?;
    Ok(DataResponse::new(stats))
}
