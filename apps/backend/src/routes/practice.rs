//! Practice and mistake set endpoints
//!
//! Every route is scoped to one set: `/api/sessions/:id/:mode/:direction`,
//! `mode` being `practice` or `mistakes` and `direction` being `forward`
//! (source to target) or `backward`.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use drill_core::PracticeError;

use crate::error::Result;
use crate::models::*;
use crate::routes::{inspect, mutate};
use crate::AppState;

/// POST /api/sessions/:id/:mode/:direction/begin
///
/// Reshuffles a set that has never been used, resumes one that has.
pub async fn begin(State(state): State<AppState>, Path(path): Path<SetPath>) -> Result<Json<SummaryResponse>> {
    let (summary, persisted) = mutate(&state, path.id, |session| Ok(session.begin(path.direction, path.mode))).await?;
    Ok(Json(SummaryResponse { summary, persisted }))
}

/// GET /api/sessions/:id/:mode/:direction/current
pub async fn current(State(state): State<AppState>, Path(path): Path<SetPath>) -> Result<Json<CurrentResponse>> {
    let response = inspect(&state, path.id, |session| {
        let prompt = match session.current_prompt(path.direction, path.mode) {
            Ok(prompt) => Some(prompt),
            Err(PracticeError::OutOfRange { .. }) => None,
            Err(e) => return Err(e.into()),
        };
        let set = session.practice_set(path.direction, path.mode);

        Ok(CurrentResponse {
            prompt,
            feedback: set.last_feedback().cloned(),
            summary: set.summary(),
        })
    })
    .await?;

    Ok(Json(response))
}

/// POST /api/sessions/:id/:mode/:direction/answer
pub async fn answer(
    State(state): State<AppState>,
    Path(path): Path<SetPath>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>> {
    let (submission, persisted) = mutate(&state, path.id, |session| {
        Ok(session.submit_answer(path.direction, path.mode, &request.answer)?)
    })
    .await?;

    tracing::debug!(
        "Session {} {:?}/{:?}: {:?} graded {}",
        path.id,
        path.mode,
        path.direction,
        submission.question,
        if submission.correct { "correct" } else { "incorrect" }
    );

    Ok(Json(AnswerResponse { submission, persisted }))
}

/// POST /api/sessions/:id/:mode/:direction/assessment
///
/// Flips the verdict of the last answer.
pub async fn change_assessment(
    State(state): State<AppState>,
    Path(path): Path<SetPath>,
) -> Result<Json<AssessmentResponse>> {
    let ((attempt, feedback, summary), persisted) = mutate(&state, path.id, |session| {
        let attempt = session.change_assessment(path.direction, path.mode)?;
        let set = session.practice_set(path.direction, path.mode);
        Ok((attempt, set.last_feedback().cloned(), set.summary()))
    })
    .await?;

    Ok(Json(AssessmentResponse {
        attempt,
        feedback,
        summary,
        persisted,
    }))
}

/// DELETE /api/sessions/:id/:mode/:direction/question
///
/// Removes the last answered word from the set and from the direction's mistakes.
pub async fn drop_question(
    State(state): State<AppState>,
    Path(path): Path<SetPath>,
) -> Result<Json<DropResponse>> {
    let ((removed, summary), persisted) = mutate(&state, path.id, |session| {
        let removed = session.drop_current_question(path.direction, path.mode)?;
        Ok((removed, session.summary(path.direction, path.mode)))
    })
    .await?;

    tracing::info!("Session {} dropped {:?} from {:?}/{:?}", path.id, removed.source, path.mode, path.direction);

    Ok(Json(DropResponse {
        removed,
        summary,
        persisted,
    }))
}

/// POST /api/sessions/:id/:mode/:direction/reset
pub async fn reset(State(state): State<AppState>, Path(path): Path<SetPath>) -> Result<Json<SummaryResponse>> {
    let (summary, persisted) = mutate(&state, path.id, |session| {
        session.reset(path.direction, path.mode);
        Ok(session.summary(path.direction, path.mode))
    })
    .await?;

    tracing::info!("Session {} reset {:?}/{:?}", path.id, path.mode, path.direction);

    Ok(Json(SummaryResponse { summary, persisted }))
}

/// GET /api/sessions/:id/:mode/:direction/attempts?filter=all|correct|incorrect
///
/// Newest first.
pub async fn attempts(
    State(state): State<AppState>,
    Path(path): Path<SetPath>,
    Query(query): Query<AttemptsQuery>,
) -> Result<Json<AttemptsResponse>> {
    let attempts = inspect(&state, path.id, |session| {
        Ok(session
            .review(path.direction, path.mode, query.filter)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(AttemptsResponse {
        filter: query.filter,
        attempts,
    }))
}
