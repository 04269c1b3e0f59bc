//! HTTP route handlers

pub mod practice;
pub mod sessions;
pub mod settings;

use drill_core::PracticeSession;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::SessionInfo;
use crate::AppState;

fn session_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("session {}", id))
}

/// Run `op` on a live session, then queue its snapshot.
///
/// Returns the result of `op` and whether the snapshot was queued. A failed
/// `op` leaves the session unchanged and saves nothing.
pub(crate) async fn mutate<T>(
    state: &AppState,
    id: Uuid,
    op: impl FnOnce(&mut PracticeSession) -> Result<T>,
) -> Result<(T, bool)> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
    let value = op(session)?;
    let persisted = state.persist(id, session);
    Ok((value, persisted))
}

/// Read from a live session.
pub(crate) async fn inspect<T>(
    state: &AppState,
    id: Uuid,
    op: impl FnOnce(&PracticeSession) -> Result<T>,
) -> Result<T> {
    let sessions = state.sessions.lock().await;
    let session = sessions.get(&id).ok_or_else(|| session_not_found(id))?;
    op(session)
}

/// Make a session live under `id`, replacing any previous one, and queue its snapshot.
pub(crate) async fn install(state: &AppState, id: Uuid, session: PracticeSession) -> (SessionInfo, bool) {
    let mut sessions = state.sessions.lock().await;
    let info = SessionInfo::from_session(id, &session);
    let persisted = state.persist(id, &session);
    sessions.insert(id, session);
    (info, persisted)
}
