//! Session lifecycle endpoints

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use drill_core::{make_key, snapshot, Exercise, PracticeSession};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::{inspect, install, session_not_found};
use crate::AppState;

/// POST /api/sessions
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    let format = request.table_format();
    let exercise = Exercise::parse(
        request.name,
        request.source_language,
        request.target_language,
        &request.content,
        format,
    )?;

    let mut session = PracticeSession::new(exercise);
    session.set_tolerance(state.config.default_tolerance);

    let id = Uuid::new_v4();
    tracing::info!(
        "Created session {} for {:?} ({} words)",
        id,
        session.exercise_name(),
        session.original_word_list().len()
    );

    let (info, persisted) = install(&state, id, session).await;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new(info, persisted, state.save_error(id))),
    ))
}

/// POST /api/sessions/import
///
/// Body is a progress snapshot as produced by the snapshot download.
pub async fn import(State(state): State<AppState>, body: Bytes) -> Result<(StatusCode, Json<SessionResponse>)> {
    let session = snapshot::deserialize(&body)?;

    let id = Uuid::new_v4();
    tracing::info!("Imported session {} for {:?}", id, session.exercise_name());

    let (info, persisted) = install(&state, id, session).await;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new(info, persisted, state.save_error(id))),
    ))
}

/// POST /api/sessions/:id/restore
pub async fn restore(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionResponse>> {
    // Pending writes for this id must land before reading it back.
    state.saver.flush().await;

    let store = Arc::clone(&state.store);
    let key = make_key(&id.to_string());
    let loaded = tokio::task::spawn_blocking(move || store.load(&key))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    let session = loaded.ok_or_else(|| ApiError::NotFound(format!("saved progress for session {}", id)))?;
    tracing::info!("Restored session {}", id);

    let (info, persisted) = install(&state, id, session).await;
    Ok(Json(SessionResponse::new(info, persisted, state.save_error(id))))
}

/// GET /api/sessions/:id
///
/// `persisted` is `false` while the last write of this session's progress
/// has failed.
pub async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionResponse>> {
    let info = inspect(&state, id, |session| Ok(SessionInfo::from_session(id, session))).await?;
    let save_error = state.save_error(id);
    Ok(Json(SessionResponse::new(info, save_error.is_none(), save_error)))
}

/// DELETE /api/sessions/:id
///
/// Closes a live session. Saved progress stays on disk and can be restored.
pub async fn close(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    let removed = state.sessions.lock().await.remove(&id);
    if removed.is_none() {
        return Err(session_not_found(id));
    }

    state.saver.forget(make_key(&id.to_string()));
    tracing::info!("Closed session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/sessions/:id/snapshot
pub async fn download(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    let (name, bytes) = inspect(&state, id, |session| {
        Ok((session.exercise_name().to_string(), snapshot::serialize(session)?))
    })
    .await?;

    let headers = [
        (header::CONTENT_TYPE, "application/json".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download_name(&name)),
        ),
    ];
    Ok((headers, bytes))
}

/// `{exercise}_progress.json` with anything unsafe for a header replaced.
fn download_name(exercise_name: &str) -> String {
    let stem: String = exercise_name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "progress.json".to_string()
    } else {
        format!("{}_progress.json", stem)
    }
}

/// GET /api/sessions/:id/mistakes
pub async fn mistakes(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<MistakesResponse>> {
    let directions = inspect(&state, id, |session| {
        Ok(Direction::BOTH
            .into_iter()
            .map(|direction| DirectionMistakes {
                direction,
                label: session.direction_label(direction),
                pairs: session.mistakes(direction).to_vec(),
            })
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(MistakesResponse { directions }))
}
