use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_ok_for_health_check(ctx: &TestContext) {

    let response = ctx.client.get("/health").await.unwrap();

    response.assert_status(StatusCode::OK);

    // Health endpoint returns plain text
    let body = String::from_utf8(response.body_bytes.clone()).unwrap();
    assert_eq!(body, "OK");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_not_ready_without_database(ctx: &TestContext) {

    let response = ctx.client.get("/health/ready").await.unwrap();

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("status").and_then(|v| v.as_str()), Some("not_ready"));
    assert_eq!(
        body.get("database").and_then(|v| v.as_str()),
        Some("disconnected")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_require_token_for_health_checks(ctx: &TestContext) {

    // The API token only guards the narration trigger
    let response = ctx.client.get("/health").await.unwrap();
    response.assert_status(StatusCode::OK);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_include_request_id_in_responses(ctx: &TestContext) {

    let response = ctx.client.get("/health").await.unwrap();
    response.assert_header_exists("x-request-id");

    let first = response.headers.get("x-request-id").cloned();
    let second = ctx
        .client
        .get("/health")
        .await
        .unwrap()
        .headers
        .get("x-request-id")
        .cloned();
    assert_ne!(first, second, "request ids must be unique");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_handle_concurrent_health_checks(ctx: &TestContext) {

    let mut futures = Vec::new();
    for _ in 0..10 {
        let client = ctx.client.clone();
        futures.push(async move { client.get("/health").await });
    }

    let results = futures::future::join_all(futures).await;

    for result in results {
        let response = result.unwrap();
        response.assert_status(StatusCode::OK);
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_unknown_routes(ctx: &TestContext) {

    let response = ctx.client.get("/api/unknown").await.unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
}
