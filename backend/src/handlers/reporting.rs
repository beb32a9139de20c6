//! Reporting handlers for movement history and export

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::error::AppResult;
use crate::services::reporting::MovementQuery;
use crate::services::ReportingService;
use crate::AppState;

/// Movement history as JSON, or CSV with `format=csv`
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementQuery>,
) -> AppResult<impl IntoResponse> {
    let service = ReportingService::new(state.store.clone());
    let movements = service
        .movement_history(&query, state.config.reporting.history_days)
        .await?;

    if query.wants_csv() {
        let csv = ReportingService::movements_to_csv(&movements)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"movements.csv\"",
                ),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(movements).into_response())
    }
}
