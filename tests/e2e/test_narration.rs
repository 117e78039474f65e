use crate::e2e::helpers;

use helpers::fixtures::{
    api_key, declared_data_len, mount_provider_audio, mount_storage_ok, pcm, provider_audio,
    requests, wait_for_requests, wav, PROVIDER_PATH,
};
use helpers::{TestContext, TEST_API_TOKEN, TEST_MAX_CHUNK_BYTES};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;
use test_context::test_context;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

const JOB_TIMEOUT: Duration = Duration::from_secs(5);

const LEGAL_CONTENT: &str = "# Dos Direitos e Garantias\n\n\
    Art. 5º Todos são iguais perante a lei, sem distinção de qualquer natureza.\n\n\
    § 1º As normas definidoras dos direitos fundamentais têm aplicação imediata.\n\n\
    I - homens e mulheres são iguais em direitos e obrigações.";

fn narration_body(topic_id: i64, content: &str) -> Value {
    json!({
        "topicId": topic_id,
        "title": "Direitos fundamentais",
        "content": content
    })
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_acknowledge_narration_immediately(ctx: &TestContext) {
    mount_provider_audio(&ctx.tts_server, &wav(480, 1)).await;
    mount_storage_ok(&ctx.storage_server).await;

    let response = ctx
        .client
        .start_narration(&narration_body(7, "Texto curto."), TEST_API_TOKEN)
        .await
        .unwrap();

    response.assert_status(StatusCode::ACCEPTED);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body, &json!({ "started": true, "topicId": 7 }));
    response.assert_header_exists("x-request-id");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_content(ctx: &TestContext) {
    let response = ctx
        .client
        .start_narration(&narration_body(7, "  \n "), TEST_API_TOKEN)
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Content cannot be empty");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(requests(&ctx.tts_server).await.is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_require_api_token(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/narrations", &narration_body(7, "Texto."))
        .await
        .unwrap();
    response
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_error_message("Missing authorization header");

    let response = ctx
        .client
        .start_narration(&narration_body(7, "Texto."), "wrong-token")
        .await
        .unwrap();
    response
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_error_message("Invalid API token");

    assert_eq!(ctx.records.attach_calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_persist_narration_url_after_pipeline(ctx: &TestContext) {
    const SAMPLES_PER_CHUNK: usize = 4_800;
    mount_provider_audio(&ctx.tts_server, &wav(SAMPLES_PER_CHUNK, 3)).await;
    mount_storage_ok(&ctx.storage_server).await;

    ctx.client
        .start_narration(&narration_body(11, LEGAL_CONTENT), TEST_API_TOKEN)
        .await
        .unwrap()
        .assert_status(StatusCode::ACCEPTED);

    let url = ctx
        .records
        .wait_for(11, JOB_TIMEOUT)
        .await
        .expect("narration was never persisted");

    let public_prefix = format!(
        "{}/storage/v1/object/public/narrations/topics/11/narration-",
        ctx.storage_server.uri()
    );
    assert!(url.starts_with(&public_prefix), "unexpected url {}", url);
    assert!(url.ends_with(".wav"));
    assert_eq!(ctx.records.attach_calls(), 1);

    // Every chunk honoured the byte budget and none spoke the title
    let provider_calls = requests(&ctx.tts_server).await;
    assert!(provider_calls.len() > 1, "content should need several chunks");
    let mut spoken = String::new();
    for call in &provider_calls {
        let body: Value = serde_json::from_slice(&call.body).unwrap();
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.len() <= TEST_MAX_CHUNK_BYTES, "chunk of {} bytes", text.len());
        spoken.push_str(text);
        spoken.push(' ');
    }
    assert!(spoken.contains("Artigo quinto"));
    assert!(spoken.contains("parágrafo primeiro"));
    assert!(spoken.contains("inciso primeiro"));
    assert!(!spoken.contains("Direitos fundamentais"));
    assert!(!spoken.contains('§'));

    // One header, every chunk's samples, exact declared size
    let uploads = requests(&ctx.storage_server).await;
    assert_eq!(uploads.len(), 1);
    let uploaded = &uploads[0].body;
    let expected = SAMPLES_PER_CHUNK * provider_calls.len();
    assert_eq!(uploaded.len(), 44 + expected);
    assert_eq!(declared_data_len(uploaded) as usize, expected);
    assert_eq!(&uploaded[0..4], b"RIFF");
    assert_eq!(
        uploads[0]
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("audio/wav")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_keep_chunk_order_when_responses_finish_out_of_order(ctx: &TestContext) {
    // Three sentences that each need their own chunk
    let content = "Alfa alfa alfa alfa alfa alfa alfa. \
                   Beta beta beta beta beta beta beta. \
                   Gama gama gama gama gama gama gama.";

    // The first chunk answers last
    Mock::given(method("POST"))
        .and(path(PROVIDER_PATH))
        .and(body_string_contains("Alfa"))
        .respond_with(provider_audio(&pcm(6, 0xA1)).set_delay(Duration::from_millis(300)))
        .mount(&ctx.tts_server)
        .await;
    Mock::given(method("POST"))
        .and(path(PROVIDER_PATH))
        .and(body_string_contains("Beta"))
        .respond_with(provider_audio(&pcm(4, 0xB2)))
        .mount(&ctx.tts_server)
        .await;
    Mock::given(method("POST"))
        .and(path(PROVIDER_PATH))
        .and(body_string_contains("Gama"))
        .respond_with(provider_audio(&wav(2, 0xC3)))
        .mount(&ctx.tts_server)
        .await;
    mount_storage_ok(&ctx.storage_server).await;

    ctx.client
        .start_narration(&narration_body(21, content), TEST_API_TOKEN)
        .await
        .unwrap()
        .assert_status(StatusCode::ACCEPTED);

    ctx.records
        .wait_for(21, JOB_TIMEOUT)
        .await
        .expect("narration was never persisted");

    let uploads = requests(&ctx.storage_server).await;
    let uploaded = &uploads[0].body;
    assert_eq!(
        &uploaded[44..],
        &[0xA1u8, 0xA1, 0xA1, 0xA1, 0xA1, 0xA1, 0xB2, 0xB2, 0xB2, 0xB2, 0xC3, 0xC3][..]
    );
    assert_eq!(declared_data_len(uploaded), 12);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_rotate_to_next_credential_on_rate_limit(ctx: &TestContext) {
    Mock::given(method("POST"))
        .and(path(PROVIDER_PATH))
        .and(header("x-goog-api-key", "key-a"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&ctx.tts_server)
        .await;
    Mock::given(method("POST"))
        .and(path(PROVIDER_PATH))
        .and(header("x-goog-api-key", "key-b"))
        .respond_with(provider_audio(&wav(480, 5)))
        .mount(&ctx.tts_server)
        .await;
    mount_storage_ok(&ctx.storage_server).await;

    ctx.client
        .start_narration(&narration_body(31, "Texto curto."), TEST_API_TOKEN)
        .await
        .unwrap()
        .assert_status(StatusCode::ACCEPTED);

    ctx.records
        .wait_for(31, JOB_TIMEOUT)
        .await
        .expect("narration was never persisted");

    let keys: Vec<Option<String>> = requests(&ctx.tts_server).await.iter().map(api_key).collect();
    assert_eq!(
        keys,
        vec![Some("key-a".to_string()), Some("key-b".to_string())]
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_persist_when_every_credential_is_rate_limited(ctx: &TestContext) {
    Mock::given(method("POST"))
        .and(path(PROVIDER_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&ctx.tts_server)
        .await;
    mount_storage_ok(&ctx.storage_server).await;

    ctx.client
        .start_narration(&narration_body(41, "Texto curto."), TEST_API_TOKEN)
        .await
        .unwrap()
        .assert_status(StatusCode::ACCEPTED);

    // two keys, two passes each
    let calls = wait_for_requests(&ctx.tts_server, 4, JOB_TIMEOUT).await;
    assert_eq!(calls.len(), 4);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(requests(&ctx.tts_server).await.len(), 4);
    assert!(requests(&ctx.storage_server).await.is_empty());
    assert_eq!(ctx.records.get(41), None);
    assert_eq!(ctx.records.attach_calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_persist_when_upload_fails(ctx: &TestContext) {
    mount_provider_audio(&ctx.tts_server, &wav(480, 1)).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.storage_server)
        .await;

    ctx.client
        .start_narration(&narration_body(51, "Texto curto."), TEST_API_TOKEN)
        .await
        .unwrap()
        .assert_status(StatusCode::ACCEPTED);

    wait_for_requests(&ctx.storage_server, 1, JOB_TIMEOUT).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(ctx.records.get(51), None);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_persist_when_provider_audio_is_corrupt(ctx: &TestContext) {
    // Declares 4800 sample bytes but carries 10
    let mut truncated = wav(4_800, 1);
    truncated.truncate(54);
    mount_provider_audio(&ctx.tts_server, &truncated).await;
    mount_storage_ok(&ctx.storage_server).await;

    ctx.client
        .start_narration(&narration_body(61, "Texto curto."), TEST_API_TOKEN)
        .await
        .unwrap()
        .assert_status(StatusCode::ACCEPTED);

    wait_for_requests(&ctx.tts_server, 1, JOB_TIMEOUT).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(requests(&ctx.storage_server).await.is_empty());
    assert_eq!(ctx.records.get(61), None);
}
