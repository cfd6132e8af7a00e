use crate::stubs::{claim, context_with, StubFederation, CREDS_RESPONSE, TOKEN_RESPONSE};
use bytes::Bytes;
use fedsign_cognito::{ContextStore, DeveloperIdentityBroker, Flow};
use fedsign_core::{Context, ErrorKind};
use fedsign_store_memory::MemoryKvStore;
use http::request::Parts;
use http::Method;

fn graphql_parts(method: Method) -> Parts {
    http::Request::builder()
        .method(method)
        .uri("https://api.example.com/graphql")
        .body(())
        .expect("request must build")
        .into_parts()
        .0
}

fn graphql_body() -> Bytes {
    Bytes::from_static(br#"{"query":"{ viewer { id } }"}"#)
}

async fn exchanged_context() -> Context {
    let stub = StubFederation::new();
    stub.push_response(200, TOKEN_RESPONSE);
    stub.push_response(200, CREDS_RESPONSE);
    let ctx = context_with(&stub);

    let broker = DeveloperIdentityBroker::new(claim(), "us-west-2", "appsync");
    Flow::new()
        .run(&ctx, &broker)
        .await
        .expect("exchange must succeed");
    ctx
}

#[tokio::test]
async fn sign_outgoing_without_context_fails() {
    let ctx = Context::new().with_kv_store(MemoryKvStore::new());
    let mut parts = graphql_parts(Method::POST);

    let err = Flow::new()
        .sign_outgoing(&ctx, &mut parts, &graphql_body())
        .await
        .expect_err("signing must fail");
    assert_eq!(err.kind(), ErrorKind::StoreInvalid);
    assert!(err.to_string().contains("run the exchange first"));
}

#[tokio::test]
async fn post_request_receives_signature_headers() -> anyhow::Result<()> {
    let ctx = exchanged_context().await;
    let mut parts = graphql_parts(Method::POST);

    Flow::new()
        .sign_outgoing(&ctx, &mut parts, &graphql_body())
        .await?;

    let authorization = parts.headers["authorization"].to_str()?;
    assert!(authorization.starts_with("AWS4-HMAC-SHA256 Credential=AK/"));
    assert!(authorization.contains("/us-west-2/appsync/aws4_request"));
    assert!(authorization
        .contains("SignedHeaders=content-type;host;x-amz-date;x-amz-security-token"));

    assert_eq!(parts.headers["x-amz-security-token"], "ST");
    assert_eq!(parts.headers["host"], "api.example.com");
    assert!(parts.headers.contains_key("x-amz-date"));
    // GraphQL bodies default to JSON when the caller set no content type.
    assert_eq!(parts.headers["content-type"], "application/json");

    Ok(())
}

#[tokio::test]
async fn get_request_passes_through_unsigned() -> anyhow::Result<()> {
    let ctx = exchanged_context().await;
    let mut parts = graphql_parts(Method::GET);

    Flow::new()
        .sign_outgoing(&ctx, &mut parts, &Bytes::new())
        .await?;

    assert!(!parts.headers.contains_key("authorization"));
    assert!(!parts.headers.contains_key("x-amz-date"));
    assert!(!parts.headers.contains_key("x-amz-security-token"));
    assert!(!parts.headers.contains_key("content-type"));
    assert_eq!(parts.uri.to_string(), "https://api.example.com/graphql");
    assert_eq!(parts.method, Method::GET);

    Ok(())
}

#[tokio::test]
async fn caller_content_type_is_preserved() -> anyhow::Result<()> {
    let ctx = exchanged_context().await;
    let mut parts = graphql_parts(Method::POST);
    parts.headers.insert(
        "content-type",
        http::HeaderValue::from_static("application/graphql"),
    );

    Flow::new()
        .sign_outgoing(&ctx, &mut parts, &graphql_body())
        .await?;

    assert_eq!(parts.headers["content-type"], "application/graphql");
    Ok(())
}

#[tokio::test]
async fn flow_over_a_session_scoped_store_key() -> anyhow::Result<()> {
    let stub = StubFederation::new();
    stub.push_response(200, TOKEN_RESPONSE);
    stub.push_response(200, CREDS_RESPONSE);
    let ctx = context_with(&stub);

    let flow = Flow::with_store(ContextStore::with_key("session/42"));
    let broker = DeveloperIdentityBroker::new(claim(), "us-west-2", "appsync");
    flow.run(&ctx, &broker).await?;

    // Nothing landed under the default key.
    assert!(ContextStore::new().get(&ctx).await.is_err());

    let mut parts = graphql_parts(Method::POST);
    flow.sign_outgoing(&ctx, &mut parts, &graphql_body()).await?;
    assert!(parts.headers.contains_key("authorization"));

    Ok(())
}

#[tokio::test]
async fn malformed_persisted_context_is_rejected() -> anyhow::Result<()> {
    let key = ContextStore::new().key().to_string();
    let body = graphql_body();

    // Not JSON at all.
    let ctx = Context::new().with_kv_store(MemoryKvStore::new());
    ctx.store_set(&key, "{ not json").await?;
    let err = Flow::new()
        .sign_outgoing(&ctx, &mut graphql_parts(Method::POST), &body)
        .await
        .expect_err("signing must fail");
    assert_eq!(err.kind(), ErrorKind::StoreInvalid);

    // Decodes, but a required field is empty.
    let ctx = Context::new().with_kv_store(MemoryKvStore::new());
    ctx.store_set(
        &key,
        r#"{"region":"us-west-2","service":"appsync","accessKeyId":"AK","secretAccessKey":"SK","sessionToken":""}"#,
    )
    .await?;
    let err = Flow::new()
        .sign_outgoing(&ctx, &mut graphql_parts(Method::POST), &body)
        .await
        .expect_err("signing must fail");
    assert_eq!(err.kind(), ErrorKind::StoreInvalid);

    Ok(())
}
