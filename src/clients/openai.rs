//! OpenAI chat, speech synthesis and transcription.

use axum::body::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::clients::classify::classify_response;
use crate::clients::error::{ClientError, ClientResult};
use crate::config::{OpenAiConfig, RetriesConfig};
use crate::resilience::{PolicyError, RetryPolicy};

const CHAT_SERVICE: &str = "openai_chat";
const TTS_SERVICE: &str = "openai_tts";
const STT_SERVICE: &str = "openai_stt";

const WHISPER_MODEL: &str = "whisper-1";

pub const SUPPORTED_VOICES: [&str; 6] = ["alloy", "echo", "fable", "onyx", "nova", "shimmer"];
pub const SUPPORTED_MODELS: [&str; 2] = ["tts-1", "tts-1-hd"];
pub const SUPPORTED_FORMATS: [&str; 6] = ["mp3", "opus", "aac", "flac", "wav", "pcm"];
pub const SUPPORTED_LANGUAGES: [&str; 4] = ["sk", "en", "ru", "uk"];

/// Options for a chat completion.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    /// Overrides `openai.chat_model`.
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.0,
            max_tokens: 512,
        }
    }
}

/// Text-to-speech request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpeechRequest {
    pub text: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_format")]
    pub response_format: String,
    #[serde(default = "default_speed")]
    pub speed: f32,
}

fn default_voice() -> String {
    "alloy".to_string()
}

fn default_model() -> String {
    "tts-1".to_string()
}

fn default_format() -> String {
    "mp3".to_string()
}

fn default_speed() -> f32 {
    1.0
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: default_voice(),
            model: default_model(),
            response_format: default_format(),
            speed: default_speed(),
        }
    }

    /// Reject parameters the speech API would refuse.
    pub fn validate(&self) -> ClientResult<()> {
        if self.text.trim().is_empty() {
            return Err(ClientError::InvalidInput("text must not be empty".into()));
        }
        if !SUPPORTED_VOICES.contains(&self.voice.as_str()) {
            return Err(ClientError::InvalidInput(format!(
                "unsupported voice '{}', expected one of {}",
                self.voice,
                SUPPORTED_VOICES.join(", ")
            )));
        }
        if !SUPPORTED_MODELS.contains(&self.model.as_str()) {
            return Err(ClientError::InvalidInput(format!(
                "unsupported model '{}', expected one of {}",
                self.model,
                SUPPORTED_MODELS.join(", ")
            )));
        }
        if !SUPPORTED_FORMATS.contains(&self.response_format.as_str()) {
            return Err(ClientError::InvalidInput(format!(
                "unsupported format '{}', expected one of {}",
                self.response_format,
                SUPPORTED_FORMATS.join(", ")
            )));
        }
        if !(0.25..=4.0).contains(&self.speed) {
            return Err(ClientError::InvalidInput(format!(
                "speed must be between 0.25 and 4.0, got {}",
                self.speed
            )));
        }
        Ok(())
    }

    /// Content type of the synthesized audio.
    pub fn media_type(&self) -> &'static str {
        match self.response_format.as_str() {
            "opus" => "audio/opus",
            "aac" => "audio/aac",
            "flac" => "audio/flac",
            "wav" => "audio/wav",
            "pcm" => "audio/pcm",
            _ => "audio/mpeg",
        }
    }
}

/// Result of a transcription.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcription {
    pub text: String,
    pub language: String,
    pub duration: Option<f64>,
    /// Mean `avg_logprob` over segments, when reported.
    pub confidence: Option<f64>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct WhisperResponse {
    #[serde(default)]
    text: String,
    language: Option<String>,
    duration: Option<f64>,
    segments: Option<Vec<WhisperSegment>>,
}

#[derive(Deserialize)]
struct WhisperSegment {
    avg_logprob: Option<f64>,
}

/// Retry policies for each OpenAI endpoint.
#[derive(Debug, Clone, Default)]
pub struct OpenAiPolicies {
    pub chat: RetryPolicy,
    pub speech: RetryPolicy,
    pub transcription: RetryPolicy,
}

impl OpenAiPolicies {
    pub fn from_config(retries: &RetriesConfig) -> Result<Self, PolicyError> {
        Ok(Self {
            chat: retries.openai_chat.policy()?,
            speech: retries.openai_tts.policy()?,
            transcription: retries.openai_stt.policy()?,
        })
    }
}

/// Client for the OpenAI REST API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
    policies: OpenAiPolicies,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, config: OpenAiConfig, policies: OpenAiPolicies) -> Self {
        Self {
            http,
            config,
            policies,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn api_key(&self) -> ClientResult<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or(ClientError::NotConfigured("OPENAI_API_KEY"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Single-turn chat completion; returns the assistant's text.
    pub async fn chat_completion(&self, prompt: &str, options: &ChatOptions) -> ClientResult<String> {
        let key = self.api_key()?;
        let model = options.model.as_deref().unwrap_or(&self.config.chat_model);
        let payload = serde_json::json!({
            "model": model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
        });
        let url = self.url("/chat/completions");
        let timeout = Duration::from_secs(self.config.chat_timeout_secs);

        tracing::debug!(model, prompt_length = prompt.len(), "Chat completion request");

        let response = self
            .policies
            .chat
            .run(CHAT_SERVICE, |_| {
                let request = self
                    .http
                    .post(&url)
                    .bearer_auth(key)
                    .timeout(timeout)
                    .json(&payload);
                async move { classify_response(request.send().await, &[]).await }
            })
            .await?;

        let body: ChatResponse = response.json().await.map_err(|e| ClientError::Decode {
            service: CHAT_SERVICE,
            reason: e.to_string(),
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ClientError::Decode {
                service: CHAT_SERVICE,
                reason: "response contained no message content".into(),
            })?;

        tracing::debug!(response_length = content.len(), "Chat completion response");
        Ok(content)
    }

    /// Synthesize speech and return the encoded audio.
    pub async fn synthesize_speech(&self, request: &SpeechRequest) -> ClientResult<Bytes> {
        request.validate()?;
        let key = self.api_key()?;
        let url = self.url("/audio/speech");
        let timeout = Duration::from_secs(self.config.tts_timeout_secs);

        let response = self
            .policies
            .speech
            .run(TTS_SERVICE, |_| {
                let outbound = self
                    .http
                    .post(&url)
                    .bearer_auth(key)
                    .timeout(timeout)
                    .json(&serde_json::json!({
                        "model": request.model,
                        "input": request.text,
                        "voice": request.voice,
                        "response_format": request.response_format,
                        "speed": request.speed,
                    }));
                async move { classify_response(outbound.send().await, &[]).await }
            })
            .await?;

        response.bytes().await.map_err(|e| ClientError::Decode {
            service: TTS_SERVICE,
            reason: e.to_string(),
        })
    }

    /// Transcribe an audio file.
    ///
    /// If the API rejects the language hint with 400, the upload is repeated
    /// once with language detection.
    pub async fn transcribe(
        &self,
        audio: Bytes,
        filename: &str,
        language: &str,
    ) -> ClientResult<Transcription> {
        if !SUPPORTED_LANGUAGES.contains(&language) {
            return Err(ClientError::InvalidInput(format!(
                "unsupported language '{}'",
                language
            )));
        }
        if audio.is_empty() {
            return Err(ClientError::InvalidInput("audio must not be empty".into()));
        }
        let key = self.api_key()?;

        let mut response = self
            .post_transcription(key, &audio, filename, Some(language), &[StatusCode::BAD_REQUEST])
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            tracing::info!(language, "Transcription rejected language hint, retrying with detection");
            response = self
                .post_transcription(key, &audio, filename, None, &[])
                .await?;
        }

        let body: WhisperResponse = response.json().await.map_err(|e| ClientError::Decode {
            service: STT_SERVICE,
            reason: e.to_string(),
        })?;

        Ok(Transcription {
            text: normalize_text(&body.text),
            language: body.language.unwrap_or_else(|| language.to_string()),
            duration: body.duration,
            confidence: body.segments.as_deref().and_then(mean_logprob),
        })
    }

    async fn post_transcription(
        &self,
        key: &str,
        audio: &Bytes,
        filename: &str,
        language: Option<&str>,
        allowed: &[StatusCode],
    ) -> ClientResult<reqwest::Response> {
        let url = self.url("/audio/transcriptions");
        let timeout = Duration::from_secs(self.config.stt_timeout_secs);

        let response = self
            .policies
            .transcription
            .run(STT_SERVICE, |_| {
                let mut form = Form::new()
                    .text("model", WHISPER_MODEL)
                    .text("response_format", "verbose_json")
                    .part("file", Part::bytes(audio.to_vec()).file_name(filename.to_string()));
                if let Some(language) = language {
                    form = form.text("language", language.to_string());
                }
                let request = self
                    .http
                    .post(&url)
                    .bearer_auth(key)
                    .timeout(timeout)
                    .multipart(form);
                async move { classify_response(request.send().await, allowed).await }
            })
            .await?;

        Ok(response)
    }
}

/// Collapse whitespace and drop zero-width characters.
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\u{200b}' | '\u{feff}'))
        .map(|c| if c == '\u{a0}' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn mean_logprob(segments: &[WhisperSegment]) -> Option<f64> {
    let values: Vec<f64> = segments.iter().filter_map(|s| s.avg_logprob).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
