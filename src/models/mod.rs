use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// Hosted providers the service knows how to address. Every entry exposes an
/// OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAi,
    Anthropic,
    Google,
    Mistral,
    Groq,
    Fireworks,
    TogetherAi,
    Xai,
    Ollama,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Google => "google",
            ProviderId::Mistral => "mistral",
            ProviderId::Groq => "groq",
            ProviderId::Fireworks => "fireworks",
            ProviderId::TogetherAi => "togetherai",
            ProviderId::Xai => "xai",
            ProviderId::Ollama => "ollama",
        }
    }

    fn base_url(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "https://api.openai.com/v1",
            ProviderId::Anthropic => "https://api.anthropic.com/v1",
            ProviderId::Google => "https://generativelanguage.googleapis.com/v1beta/openai",
            ProviderId::Mistral => "https://api.mistral.ai/v1",
            ProviderId::Groq => "https://api.groq.com/openai/v1",
            ProviderId::Fireworks => "https://api.fireworks.ai/inference/v1",
            ProviderId::TogetherAi => "https://api.together.xyz/v1",
            ProviderId::Xai => "https://api.x.ai/v1",
            ProviderId::Ollama => "http://localhost:11434/v1",
        }
    }

    fn api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderId::OpenAi => Some("OPENAI_API_KEY"),
            ProviderId::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderId::Google => Some("GOOGLE_AI_API_KEY"),
            ProviderId::Mistral => Some("MISTRAL_API_KEY"),
            ProviderId::Groq => Some("GROQ_API_KEY"),
            ProviderId::Fireworks => Some("FIREWORKS_API_KEY"),
            ProviderId::TogetherAi => Some("TOGETHER_API_KEY"),
            ProviderId::Xai => Some("XAI_API_KEY"),
            ProviderId::Ollama => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LLMModel {
    pub id: String,
    pub provider_id: ProviderId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LLMModelConfig {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default, rename = "baseURL")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub top_p: Option<f64>,
    #[serde(default)]
    pub top_k: Option<u32>,
    #[serde(default)]
    pub frequency_penalty: Option<f64>,
    #[serde(default)]
    pub presence_penalty: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl LLMModelConfig {
    /// Caller-supplied API key. Empty strings count as absent, so blank form
    /// fields keep rate limiting in force.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }
}

/// Generation strategy passed to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Auto,
    Json,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Auto => "auto",
            Mode::Json => "json",
        }
    }
}

pub fn default_mode(model: &LLMModel) -> Mode {
    // Fireworks rejects the schema response format; it wants plain json mode.
    match model.provider_id {
        ProviderId::Fireworks => Mode::Json,
        _ => Mode::Auto,
    }
}

/// Resolved handle for one upstream model endpoint.
#[derive(Debug, Clone)]
pub struct ModelClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
    pub(crate) model: String,
}

pub fn model_client(
    model: &LLMModel,
    config: &LLMModelConfig,
    http: reqwest::Client,
) -> anyhow::Result<ModelClient> {
    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| model.provider_id.base_url().to_string());

    let api_key = match config.api_key() {
        Some(key) => Some(key.to_string()),
        None => match model.provider_id.api_key_env() {
            Some(var) => Some(dotenvy::var(var).map_err(|_| {
                anyhow!(
                    "missing {var} for provider {}",
                    model.provider_id.as_str()
                )
            })?),
            None => None,
        },
    };

    let name = config.model.clone().unwrap_or_else(|| model.id.clone());

    Ok(ModelClient {
        http,
        base_url,
        api_key,
        model: name,
    })
}
