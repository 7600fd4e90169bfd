use axum::{Json, extract::State, http::HeaderMap};
use serde::Deserialize;

use super::session::{SessionView, session_id};
use crate::AppState;
use crate::error::AppResult;

#[derive(Debug, Deserialize)]
pub struct AnalyzeBody {
    pub subject: String,
}

/// The submit action. One generation per submit; a failure leaves the
/// session where it was and surfaces the error envelope inline.
pub async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AnalyzeBody>,
) -> AppResult<Json<SessionView>> {
    let id = session_id(&headers);

    let report = state.generator.generate(&body.subject).await?;
    state.sessions.set_report(id, body.subject, report);

    Ok(Json(SessionView::new(id, state.sessions.get(id))))
}
