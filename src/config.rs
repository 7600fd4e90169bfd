use std::env;

use crate::llm::gemini::GEMINI_BASE_URL;

/// Generation parameters fixed by this application. Overridable through
/// the environment for operators, never per user.
pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

/// Naming convention for the provider's faster/cheaper model tier.
pub const DEFAULT_TIER_KEYWORD: &str = "flash";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub gemini_base_url: String,
    pub model_tier_keyword: String,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
    pub default_temperature: f32,
    pub default_max_tokens: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            port: env::var("APP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("APP_PORT must be a number"),
            environment: env::var("ANALYST_ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| GEMINI_BASE_URL.to_string()),
            model_tier_keyword: env::var("MODEL_TIER_KEYWORD")
                .unwrap_or_else(|_| DEFAULT_TIER_KEYWORD.to_string()),
            otel_service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "ai-stock-analyst".to_string()),
            otel_exporter_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
            default_temperature: env::var("DEFAULT_TEMPERATURE")
                .unwrap_or_else(|_| DEFAULT_TEMPERATURE.to_string())
                .parse()
                .expect("DEFAULT_TEMPERATURE must be a number"),
            default_max_tokens: env::var("DEFAULT_MAX_TOKENS")
                .unwrap_or_else(|_| DEFAULT_MAX_OUTPUT_TOKENS.to_string())
                .parse()
                .expect("DEFAULT_MAX_TOKENS must be a number"),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_defaults() {
        assert_eq!(DEFAULT_TEMPERATURE, 0.5);
        assert_eq!(DEFAULT_MAX_OUTPUT_TOKENS, 8192);
        assert_eq!(DEFAULT_TIER_KEYWORD, "flash");
    }
}
