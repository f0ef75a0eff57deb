//! Delivery-staff read endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Duration, Utc};
use order_store::OrderStore;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::orders::{AppState, parse_user_id};

#[derive(Debug, Deserialize)]
pub struct PerformanceQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct PerformanceResponse {
    pub staff_id: String,
    pub from: String,
    pub to: String,
    pub total_assigned: usize,
    pub delivered: usize,
    pub delivery_rate: f64,
    pub average_delivery_ms: Option<i64>,
}

/// GET /staff/:id/performance?from=&to= — delivery figures over a window.
///
/// The window defaults to the last 30 days.
#[tracing::instrument(skip(state))]
pub async fn performance<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Query(query): Query<PerformanceQuery>,
) -> Result<Json<PerformanceResponse>, ApiError> {
    let staff_id = parse_user_id(&id, "staff id")?;

    let to = query.to.unwrap_or_else(Utc::now);
    let from = query.from.unwrap_or(to - Duration::days(30));
    if from >= to {
        return Err(ApiError::BadRequest(
            "window start must precede window end".to_string(),
        ));
    }

    let perf = state.engine.staff_performance(staff_id, from, to).await?;

    Ok(Json(PerformanceResponse {
        staff_id: perf.staff.to_string(),
        from: perf.from.to_rfc3339(),
        to: perf.to.to_rfc3339(),
        total_assigned: perf.total_assigned,
        delivered: perf.delivered,
        delivery_rate: perf.delivery_rate,
        average_delivery_ms: perf.average_delivery_ms,
    }))
}
