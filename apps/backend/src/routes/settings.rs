//! Settings endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::routes::mutate;
use crate::AppState;

/// PUT /api/sessions/:id/settings
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>> {
    let ((tolerance, ignore_accents), persisted) = mutate(&state, id, |session| {
        if let Some(tolerance) = request.tolerance {
            session.set_tolerance(tolerance.min(100) as u8);
        }
        if let Some(ignore_accents) = request.ignore_accents {
            session.set_ignore_accents(ignore_accents);
        }
        Ok((session.tolerance(), session.ignore_accents()))
    })
    .await?;

    tracing::info!(
        "Session {} settings: tolerance {}, ignore accents {}",
        id,
        tolerance,
        ignore_accents
    );

    Ok(Json(SettingsResponse {
        tolerance,
        ignore_accents,
        persisted,
    }))
}
