//! Client for the remote speech backend
//!
//! Three JSON endpoints drive a turn: `/tts` synthesizes the prompt,
//! `/stt` transcribes the recorded clip, `/chat` produces the spoken
//! motivational reply. Audio travels as base64-encoded WAV.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::{Error, Result};

/// Request body for `/tts`
#[derive(serde::Serialize)]
struct TtsRequest<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

/// Request body for `/chat`
#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    #[serde(rename = "Message")]
    message: &'a str,
    #[serde(rename = "CorrectWord")]
    correct_word: &'a str,
}

/// Response carrying base64 WAV audio (`/tts` and `/chat`)
#[derive(serde::Deserialize)]
struct AudioResponse {
    audio: Option<String>,
}

/// Response from `/stt`
///
/// `text` may be absent or null; both count as an empty transcript.
#[derive(serde::Deserialize)]
struct SttResponse {
    #[serde(default)]
    text: Option<String>,
}

/// Remote speech operations the sequencer depends on
///
/// The seam for tests: the sequencer is generic over this trait so turns
/// can run against a scripted backend without a network.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Synthesize speech for a word or phrase, returning WAV bytes
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;

    /// Transcribe a recorded WAV clip to text
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String>;

    /// Generate a spoken reply to an attempt, returning WAV bytes
    async fn reply(&self, message: &str, correct_word: &str) -> Result<Vec<u8>>;
}

/// HTTP client for the speech backend
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the backend at `base_url`
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is empty or the client cannot be built
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        if base_url.is_empty() {
            return Err(Error::Config("backend base URL required".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Decode the base64 audio field of a `/tts` or `/chat` response
    fn decode_audio(response: AudioResponse, endpoint: &str) -> Result<Vec<u8>> {
        let encoded = response.audio.ok_or_else(|| {
            Error::MalformedResponse(format!("{endpoint} response missing audio field"))
        })?;
        BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| Error::MalformedResponse(format!("{endpoint} audio not base64: {e}")))
    }
}

#[async_trait]
impl SpeechBackend for ApiClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        tracing::debug!(text, "requesting TTS");

        let response = self
            .client
            .post(format!("{}/tts", self.base_url))
            .json(&TtsRequest { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "TTS request failed");
            return Err(Error::Tts(format!("TTS error {status}: {body}")));
        }

        let audio = Self::decode_audio(response.json().await?, "/tts")?;
        tracing::debug!(audio_bytes = audio.len(), "TTS audio received");
        Ok(audio)
    }

    async fn transcribe(&self, audio: Vec<u8>) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "uploading clip for transcription");

        let form = reqwest::multipart::Form::new().part(
            "audio",
            reqwest::multipart::Part::bytes(audio)
                .file_name("clip.wav")
                .mime_str("audio/wav")
                .map_err(|e| Error::Stt(e.to_string()))?,
        );

        let response = self
            .client
            .post(format!("{}/stt", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "STT request failed");
            return Err(Error::Stt(format!("STT error {status}: {body}")));
        }

        let result: SttResponse = response.json().await?;
        let text = result.text.unwrap_or_default().trim().to_string();
        tracing::info!(transcript = %text, "transcription complete");
        Ok(text)
    }

    async fn reply(&self, message: &str, correct_word: &str) -> Result<Vec<u8>> {
        tracing::debug!(message, correct_word, "requesting chat reply");

        let response = self
            .client
            .post(format!("{}/chat", self.base_url))
            .json(&ChatRequest {
                message,
                correct_word,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "chat request failed");
            return Err(Error::Chat(format!("chat error {status}: {body}")));
        }

        let audio = Self::decode_audio(response.json().await?, "/chat")?;
        tracing::debug!(audio_bytes = audio.len(), "reply audio received");
        Ok(audio)
    }
}
