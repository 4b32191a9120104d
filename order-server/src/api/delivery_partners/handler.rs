//! Delivery Partner API Handlers

use axum::extract::State;
use serde::Deserialize;
use shared::models::NearbyPartner;
use validator::Validate;

use crate::api::ApiQuery;
use crate::auth::{CurrentUser, permissions};
use crate::core::ServerState;
use crate::db::repository::{RepoError, actor};
use crate::utils::{ApiResponse, AppResult, ok};

const DEFAULT_RADIUS_METERS: f64 = 5_000.0;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AvailableQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(default = "default_radius")]
    #[validate(range(min = 0.0, max = 100_000.0))]
    pub radius_meters: f64,
}

fn default_radius() -> f64 {
    DEFAULT_RADIUS_METERS
}

/// Eligible partners around a point, nearest first
pub async fn available(
    user: CurrentUser,
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<AvailableQuery>,
) -> AppResult<ApiResponse<Vec<NearbyPartner>>> {
    user.require_any(permissions::AVAILABLE_PARTNERS)?;
    query.validate()?;

    let mut conn = state.db.pool.acquire().await.map_err(RepoError::from)?;
    let partners = actor::find_available_partners_near(
        &mut conn,
        query.latitude,
        query.longitude,
        query.radius_meters,
    )
    .await?;
    Ok(ok(partners))
}
