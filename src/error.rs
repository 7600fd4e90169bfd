use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use opentelemetry::trace::TraceContextExt;
use serde_json::json;
use thiserror::Error;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// User-facing notice shown when the provider rate-limits a request.
/// No automatic retry happens; the user is asked to resubmit later.
pub const RATE_LIMIT_NOTICE: &str = "🚦 접속자가 많아 분석이 지연되고 있습니다! \
    현재 너무 많은 요청이 몰려 AI가 잠시 숨을 고르고 있습니다. \
    약 1분 뒤에 다시 시도해 주시면 감사하겠습니다. 🙏";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("empty subject")]
    EmptySubject,

    #[error("missing provider credential")]
    MissingCredential,

    #[error("provider rate limited the request")]
    RateLimited,

    #[error("no generation-capable model available")]
    ProviderUnavailable,

    #[error("generation failed: {0}")]
    Generation(String),
}

fn get_trace_id() -> Option<String> {
    let span = Span::current();
    let context = span.context();
    let span_ref = context.span();
    let span_context = span_ref.span_context();

    if span_context.is_valid() {
        Some(span_context.trace_id().to_string())
    } else {
        None
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::EmptySubject => (
                StatusCode::BAD_REQUEST,
                "⚠️ 종목명을 입력해주세요.".to_string(),
            ),
            AppError::MissingCredential => (
                StatusCode::UNAUTHORIZED,
                "⚠️ API 키가 필요합니다.".to_string(),
            ),
            AppError::RateLimited => {
                tracing::warn!("provider rate limited the request");
                (StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_NOTICE.to_string())
            }
            AppError::ProviderUnavailable => {
                tracing::error!("no generation-capable model in provider listing");
                (
                    StatusCode::BAD_GATEWAY,
                    "⚠️ 사용 가능한 분석 모델이 없습니다.".to_string(),
                )
            }
            // Provider message passes through verbatim.
            AppError::Generation(msg) => {
                tracing::error!(error = %msg, "Generation error");
                (StatusCode::BAD_GATEWAY, format!("❌ 에러 발생: {msg}"))
            }
        };

        let body = if let Some(trace_id) = get_trace_id() {
            json!({
                "error": error_message,
                "status": status.as_u16(),
                "trace_id": trace_id,
            })
        } else {
            json!({
                "error": error_message,
                "status": status.as_u16(),
            })
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    async fn response_parts(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_error_display() {
        assert_eq!(AppError::EmptySubject.to_string(), "empty subject");
        assert_eq!(
            AppError::MissingCredential.to_string(),
            "missing provider credential"
        );
        assert_eq!(
            AppError::Generation("quota exceeded".to_string()).to_string(),
            "generation failed: quota exceeded"
        );
    }

    #[tokio::test]
    async fn test_empty_subject_is_bad_request() {
        let (status, body) = response_parts(AppError::EmptySubject).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "⚠️ 종목명을 입력해주세요.");
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn test_missing_credential_is_unauthorized() {
        let (status, body) = response_parts(AppError::MissingCredential).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "⚠️ API 키가 필요합니다.");
    }

    #[tokio::test]
    async fn test_rate_limited_uses_friendly_notice() {
        let (status, body) = response_parts(AppError::RateLimited).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        let message = body["error"].as_str().unwrap();
        assert_eq!(message, RATE_LIMIT_NOTICE);
        // The raw provider text never reaches the user.
        assert!(!message.contains("429"));
    }

    #[tokio::test]
    async fn test_provider_unavailable_is_bad_gateway() {
        let (status, _) = response_parts(AppError::ProviderUnavailable).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_generation_error_passes_provider_message_through() {
        let (status, body) =
            response_parts(AppError::Generation("model overloaded".to_string())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "❌ 에러 발생: model overloaded");
    }
}
