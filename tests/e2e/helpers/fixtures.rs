use base64::{engine::general_purpose::STANDARD, Engine as _};
use narration_backend::domain::narration::wav::WavHeader;
use narration_backend::domain::narration::AudioFormat;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const PROVIDER_PATH: &str = "/models/test-tts-model:generateContent";
pub const PROVIDER_MIME: &str = "audio/L16;codec=pcm;rate=24000";

/// A canonical WAV container holding `data_len` bytes of `fill`.
pub fn wav(data_len: usize, fill: u8) -> Vec<u8> {
    let mut bytes = WavHeader::new(AudioFormat::PROVIDER_DEFAULT, data_len as u32)
        .unwrap()
        .encode()
        .to_vec();
    bytes.extend(std::iter::repeat(fill).take(data_len));
    bytes
}

/// Raw PCM with no container.
pub fn pcm(data_len: usize, fill: u8) -> Vec<u8> {
    vec![fill; data_len]
}

/// Body of a successful `generateContent` call carrying `audio`.
pub fn provider_audio_body(audio: &[u8]) -> Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{
                    "inlineData": {
                        "mimeType": PROVIDER_MIME,
                        "data": STANDARD.encode(audio)
                    }
                }]
            },
            "finishReason": "STOP"
        }]
    })
}

pub fn provider_audio(audio: &[u8]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(provider_audio_body(audio))
}

pub async fn mount_provider_audio(server: &MockServer, audio: &[u8]) {
    Mock::given(method("POST"))
        .and(path(PROVIDER_PATH))
        .respond_with(provider_audio(audio))
        .mount(server)
        .await;
}

pub async fn mount_storage_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/narrations/topics/\d+/narration-\d+\.wav$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "ok" })))
        .mount(server)
        .await;
}

pub async fn requests(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.unwrap_or_default()
}

/// Waits until `server` has seen at least `count` requests.
pub async fn wait_for_requests(server: &MockServer, count: usize, timeout: Duration) -> Vec<Request> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let received = requests(server).await;
        if received.len() >= count || tokio::time::Instant::now() >= deadline {
            return received;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

pub fn api_key(request: &Request) -> Option<String> {
    request
        .headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn declared_data_len(wav: &[u8]) -> u32 {
    u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]])
}
