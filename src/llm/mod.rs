pub mod gemini;
pub mod select;

use crate::secrets::Secret;

/// A provider-side model as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub id: String,
    /// Whether the model supports content generation.
    pub capable: bool,
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub finish_reason: String,
}

/// The provider SDK surface this service depends on. The credential is
/// passed per call and never held by the provider.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    async fn list_models(&self, api_key: &Secret) -> anyhow::Result<Vec<ModelDescriptor>>;
    async fn generate(
        &self,
        api_key: &Secret,
        req: &GenerateRequest,
    ) -> anyhow::Result<GenerateResponse>;
    fn name(&self) -> &str;
}
