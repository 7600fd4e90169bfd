use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use opentelemetry::KeyValue;
use tracing::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::error::{AppError, AppResult};
use crate::llm::select::ModelSelector;
use crate::llm::{GenerateRequest, GenerateResponse, Provider};
use crate::secrets::{GEMINI_API_KEY, Secret, SecretStore};
use crate::telemetry::metrics::{
    GEN_AI_ERROR_COUNT, GEN_AI_OPERATION_DURATION, GEN_AI_TOKEN_USAGE,
    REPORT_GENERATION_DURATION,
};

use super::Report;
use super::normalize::normalize;
use super::prompt::build_prompt;

/// Fixed generation parameters. Operator-tunable through the environment,
/// never exposed to the user.
#[derive(Debug, Clone, Copy)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

pub struct ReportGenerator {
    secrets: Arc<dyn SecretStore>,
    provider: Arc<dyn Provider>,
    selector: Arc<dyn ModelSelector>,
    generation: GenerationConfig,
}

impl ReportGenerator {
    pub fn new(
        secrets: Arc<dyn SecretStore>,
        provider: Arc<dyn Provider>,
        selector: Arc<dyn ModelSelector>,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            secrets,
            provider,
            selector,
            generation,
        }
    }

    /// Runs one full analysis: credential lookup, model resolution, one
    /// generation call, markdown normalization. Every failure is terminal
    /// for the request; nothing is retried.
    #[tracing::instrument(
        name = "pipeline report",
        skip(self),
        fields(
            report.model,
            report.duration_ms,
        )
    )]
    pub async fn generate(&self, subject: &str) -> AppResult<Report> {
        let start = Instant::now();

        let api_key = self
            .secrets
            .get(GEMINI_API_KEY)
            .ok_or(AppError::MissingCredential)?;

        if subject.is_empty() {
            return Err(AppError::EmptySubject);
        }

        // Listed fresh on every request; selection policy lives behind
        // the ModelSelector trait.
        let models = self
            .provider
            .list_models(&api_key)
            .await
            .map_err(to_app_error)?;
        let model = self
            .selector
            .select(&models)
            .ok_or(AppError::ProviderUnavailable)?
            .id
            .clone();

        let req = GenerateRequest {
            model,
            prompt: build_prompt(subject),
            temperature: self.generation.temperature,
            max_output_tokens: self.generation.max_output_tokens,
        };

        let resp = self.generate_once(&api_key, &req).await?;
        let markdown = normalize(&resp.content);

        let duration = start.elapsed();
        REPORT_GENERATION_DURATION.record(duration.as_secs_f64(), &[]);

        let span = tracing::Span::current();
        span.record("report.model", resp.model.as_str());
        span.record("report.duration_ms", duration.as_millis() as u64);

        Ok(Report {
            markdown,
            model: resp.model,
            generated_at: Utc::now(),
        })
    }

    async fn generate_once(
        &self,
        api_key: &Secret,
        req: &GenerateRequest,
    ) -> AppResult<GenerateResponse> {
        let provider_name = self.provider.name().to_string();
        let span_display_name = format!("gen_ai.chat {}", req.model);
        let start = Instant::now();

        let span = tracing::info_span!(
            "gen_ai.chat",
            otel.name = %span_display_name,
            gen_ai.operation.name = "chat",
            gen_ai.provider.name = %provider_name,
            gen_ai.request.model = %req.model,
            gen_ai.request.temperature = req.temperature,
            gen_ai.request.max_tokens = req.max_output_tokens as i64,
            gen_ai.response.model = tracing::field::Empty,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
            gen_ai.response.finish_reasons = tracing::field::Empty,
            otel.status_code = tracing::field::Empty,
            error.type = tracing::field::Empty,
        );

        span.add_event(
            "gen_ai.user.message",
            vec![KeyValue::new("gen_ai.prompt", truncate(&req.prompt, 1000))],
        );

        let result = self
            .provider
            .generate(api_key, req)
            .instrument(span.clone())
            .await;

        let duration = start.elapsed().as_secs_f64();

        match result {
            Ok(resp) => {
                span.record("gen_ai.response.model", resp.model.as_str());
                span.record("gen_ai.usage.input_tokens", resp.input_tokens as i64);
                span.record("gen_ai.usage.output_tokens", resp.output_tokens as i64);
                if !resp.finish_reason.is_empty() {
                    span.record(
                        "gen_ai.response.finish_reasons",
                        resp.finish_reason.as_str(),
                    );
                }

                let op_kv = KeyValue::new("gen_ai.operation.name", "chat");
                let provider_kv = KeyValue::new("gen_ai.provider.name", provider_name);
                let model_kv = KeyValue::new("gen_ai.request.model", resp.model.clone());

                GEN_AI_TOKEN_USAGE.record(
                    f64::from(resp.input_tokens),
                    &[
                        KeyValue::new("gen_ai.token.type", "input"),
                        op_kv.clone(),
                        provider_kv.clone(),
                        model_kv.clone(),
                    ],
                );
                GEN_AI_TOKEN_USAGE.record(
                    f64::from(resp.output_tokens),
                    &[
                        KeyValue::new("gen_ai.token.type", "output"),
                        op_kv.clone(),
                        provider_kv.clone(),
                        model_kv.clone(),
                    ],
                );
                GEN_AI_OPERATION_DURATION.record(duration, &[op_kv, provider_kv, model_kv]);

                Ok(resp)
            }
            Err(err) => {
                let app_err = to_app_error(err);
                span.record("otel.status_code", "ERROR");
                span.record("error.type", error_type(&app_err));

                GEN_AI_ERROR_COUNT.add(
                    1,
                    &[
                        KeyValue::new("gen_ai.provider.name", provider_name),
                        KeyValue::new("gen_ai.request.model", req.model.clone()),
                    ],
                );

                Err(app_err)
            }
        }
    }
}

/// Maps a raw provider error onto the request taxonomy. A rate-limit
/// condition is recognized by the "429" marker in the error text; every
/// other provider message passes through verbatim.
fn to_app_error(err: anyhow::Error) -> AppError {
    let msg = err.to_string();
    if msg.contains("429") {
        AppError::RateLimited
    } else {
        AppError::Generation(msg)
    }
}

fn error_type(err: &AppError) -> &'static str {
    match err {
        AppError::RateLimited => "rate_limit",
        _ => "provider_error",
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        s.char_indices()
            .take_while(|&(i, _)| i < max)
            .map(|(_, c)| c)
            .collect()
    }
}
