use axum::{Json, extract::State, http::HeaderMap};
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use crate::session::SessionState;

/// Fixed page title, exposed in every session view.
pub const PAGE_TITLE: &str = "AI 종목 분석기";

pub const DISCLAIMER: &str = "⚠️ 투자 유의사항: 이 리포트는 AI가 학습된 데이터를 바탕으로 \
    생성하므로, 실시간 정보와 차이가 있을 수 있습니다. 투자의 책임은 전적으로 본인에게 있습니다.";

pub const SESSION_HEADER: &str = "x-session-id";

/// What the rendering layer receives: the session id, the page chrome
/// constants, and the explicit session state.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub title: &'static str,
    #[serde(flatten)]
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<&'static str>,
}

impl SessionView {
    pub fn new(session_id: Uuid, state: SessionState) -> Self {
        let (headline, disclaimer) = match &state {
            SessionState::Report { subject, .. } => (
                Some(format!("📊 {subject} 핵심 투자 요약")),
                Some(DISCLAIMER),
            ),
            SessionState::Home => (None, None),
        };
        Self {
            session_id,
            title: PAGE_TITLE,
            state,
            headline,
            disclaimer,
        }
    }
}

/// Session identity comes from the `x-session-id` header; anything
/// missing or unparsable denotes a fresh session.
pub fn session_id(headers: &HeaderMap) -> Uuid {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .unwrap_or_else(Uuid::new_v4)
}

pub async fn get_session(State(state): State<AppState>, headers: HeaderMap) -> Json<SessionView> {
    let id = session_id(&headers);
    Json(SessionView::new(id, state.sessions.get(id)))
}

pub async fn go_back(State(state): State<AppState>, headers: HeaderMap) -> Json<SessionView> {
    let id = session_id(&headers);
    state.sessions.go_home(id);
    Json(SessionView::new(id, SessionState::Home))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;

    use crate::report::Report;

    #[test]
    fn test_session_id_parses_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(session_id(&headers), id);
    }

    #[test]
    fn test_session_id_fresh_when_missing_or_invalid() {
        let headers = HeaderMap::new();
        let first = session_id(&headers);
        let second = session_id(&headers);
        assert_ne!(first, second);

        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("not-a-uuid"));
        let third = session_id(&headers);
        assert_ne!(third, first);
    }

    #[test]
    fn test_home_view_has_no_report_chrome() {
        let view = SessionView::new(Uuid::new_v4(), SessionState::Home);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["title"], "AI 종목 분석기");
        assert_eq!(json["state"], "home");
        assert!(json.get("headline").is_none());
        assert!(json.get("disclaimer").is_none());
    }

    #[test]
    fn test_report_view_carries_headline_and_disclaimer() {
        let state = SessionState::Report {
            subject: "삼성전자".to_string(),
            report: Report {
                markdown: "### 1. 기업 개요\n\n* 내용".to_string(),
                model: "models/gemini-1.5-flash".to_string(),
                generated_at: Utc::now(),
            },
        };
        let json = serde_json::to_value(SessionView::new(Uuid::new_v4(), state)).unwrap();
        assert_eq!(json["state"], "report");
        assert_eq!(json["headline"], "📊 삼성전자 핵심 투자 요약");
        assert_eq!(json["disclaimer"], DISCLAIMER);
        assert_eq!(json["report"]["markdown"], "### 1. 기업 개요\n\n* 내용");
    }
}
