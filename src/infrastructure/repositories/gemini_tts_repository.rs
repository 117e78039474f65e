use super::tts_repository::{ProviderAudio, ProviderError, TtsRepository};
use crate::domain::narration::AudioFormat;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Gemini speech generation over the `generateContent` REST endpoint.
pub struct GeminiTtsRepository {
    client: Client,
    base_url: String,
    model: String,
    voice: String,
}

impl GeminiTtsRepository {
    pub fn new(client: Client, base_url: String, model: String, voice: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            voice,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn request_body<'a>(&'a self, text: &'a str) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text }],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["AUDIO"],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: &self.voice,
                        },
                    },
                },
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: Vec<&'a str>,
    speech_config: SpeechConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig<'a> {
    voice_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: String,
}

/// Reads PCM parameters from a MIME type such as `audio/L16;codec=pcm;rate=24000`.
/// Missing parameters fall back to the provider default.
pub fn format_from_mime(mime: &str) -> AudioFormat {
    let mut format = AudioFormat::PROVIDER_DEFAULT;
    let mut params = mime.split(';').map(str::trim);

    if let Some(essence) = params.next() {
        let essence = essence.to_ascii_lowercase();
        if essence.ends_with("/l8") {
            format.bits_per_sample = 8;
        } else if essence.ends_with("/l24") {
            format.bits_per_sample = 24;
        }
    }

    for param in params {
        let Some((name, value)) = param.split_once('=') else {
            continue;
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "rate" => {
                if let Ok(rate) = value.trim().parse() {
                    format.sample_rate = rate;
                }
            }
            "channels" => {
                if let Ok(channels) = value.trim().parse() {
                    format.channels = channels;
                }
            }
            _ => {}
        }
    }

    format
}

fn decode_audio(response: GenerateContentResponse) -> Result<ProviderAudio, ProviderError> {
    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .unwrap_or_default();

    let mut format = None;
    let mut bytes = Vec::new();
    for inline in parts.into_iter().filter_map(|p| p.inline_data) {
        if format.is_none() {
            format = Some(
                inline
                    .mime_type
                    .as_deref()
                    .map(format_from_mime)
                    .unwrap_or_default(),
            );
        }
        let decoded = STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| ProviderError::MalformedResponse(format!("invalid base64 audio: {}", e)))?;
        bytes.extend_from_slice(&decoded);
    }

    match format {
        Some(format) if !bytes.is_empty() => Ok(ProviderAudio { bytes, format }),
        _ => Err(ProviderError::MalformedResponse(
            "response carried no audio".to_string(),
        )),
    }
}

#[async_trait]
impl TtsRepository for GeminiTtsRepository {
    async fn synthesize(&self, text: &str, api_key: &str) -> Result<ProviderAudio, ProviderError> {
        tracing::debug!(
            model = %self.model,
            voice = %self.voice,
            text_length = text.len(),
            "Calling speech provider"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&self.request_body(text))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();
            tracing::warn!(
                status = status.as_u16(),
                body = %body,
                "Speech provider returned an error status"
            );
            return Err(ProviderError::from_status(status.as_u16()));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let audio = decode_audio(payload)?;
        tracing::debug!(
            audio_size = audio.bytes.len(),
            sample_rate = audio.format.sample_rate,
            "Speech provider audio received"
        );

        Ok(audio)
    }
}
