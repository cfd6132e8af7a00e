use crate::stubs::{claim, context_with, StubFederation, CREDS_RESPONSE, TOKEN_RESPONSE};
use fedsign_cognito::{ContextStore, CredentialSet, DeveloperIdentityBroker, Flow, IdentityClaim};
use fedsign_core::ErrorKind;
use pretty_assertions::assert_eq;

fn broker() -> DeveloperIdentityBroker {
    DeveloperIdentityBroker::new(claim(), "us-west-2", "appsync")
}

fn expected_set() -> CredentialSet {
    CredentialSet {
        region: "us-west-2".to_string(),
        service: "appsync".to_string(),
        access_key_id: "AK".to_string(),
        secret_access_key: "SK".to_string(),
        session_token: "ST".to_string(),
    }
}

#[tokio::test]
async fn run_persists_exchanged_credentials() -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let stub = StubFederation::new();
    stub.push_response(200, TOKEN_RESPONSE);
    stub.push_response(200, CREDS_RESPONSE);
    let ctx = context_with(&stub);

    let set = Flow::new().run(&ctx, &broker()).await?;
    assert_eq!(set, expected_set());
    assert_eq!(ContextStore::new().get(&ctx).await?, expected_set());

    let calls = stub.calls();
    assert_eq!(calls.len(), 2);

    assert_eq!(
        calls[0].target(),
        "AWSCognitoIdentityService.GetOpenIdTokenForDeveloperIdentity"
    );
    assert_eq!(calls[0].uri, "https://cognito-identity.us-west-2.amazonaws.com/");
    assert_eq!(calls[0].headers["content-type"], "application/x-amz-json-1.1");
    assert!(calls[0].body.contains(r#""IdentityPoolId":"pool1""#));
    assert!(calls[0].body.contains(r#""login.example.com":"u1""#));

    assert_eq!(
        calls[1].target(),
        "AWSCognitoIdentityService.GetCredentialsForIdentity"
    );
    assert!(calls[1].body.contains(r#""IdentityId":"id123""#));
    assert!(calls[1]
        .body
        .contains(r#""cognito-identity.amazonaws.com":"tok456""#));

    // The enhanced flow goes out unsigned unless static keys are supplied.
    assert!(calls[0].authorization().is_none());
    assert!(calls[1].authorization().is_none());

    Ok(())
}

#[tokio::test]
async fn missing_claim_field_aborts_before_any_network_call() {
    let cases: Vec<(&str, fn(&mut IdentityClaim))> = vec![
        ("user_identity", |c| c.user_identity.clear()),
        ("password", |c| c.password.clear()),
        ("identity_pool_id", |c| c.identity_pool_id.clear()),
        ("developer_provider", |c| c.developer_provider.clear()),
    ];

    for (name, clear) in cases {
        let stub = StubFederation::new();
        let ctx = context_with(&stub);

        let mut c = claim();
        clear(&mut c);
        let broker = DeveloperIdentityBroker::new(c, "us-west-2", "appsync");

        let err = Flow::new()
            .run(&ctx, &broker)
            .await
            .expect_err("run must fail");
        assert_eq!(err.kind(), ErrorKind::ClaimInvalid);
        assert!(err.to_string().contains(name), "error {err} must name {name}");
        assert_eq!(stub.call_count(), 0);

        // And nothing was persisted.
        assert!(ContextStore::new().get(&ctx).await.is_err());
    }
}

#[tokio::test]
async fn provider_rejection_surfaces_raw_payload() {
    let stub = StubFederation::new();
    stub.push_response(
        400,
        r#"{"__type":"ResourceNotFoundException","message":"IdentityPool 'pool1' not found."}"#,
    );
    let ctx = context_with(&stub);

    let err = Flow::new()
        .run(&ctx, &broker())
        .await
        .expect_err("run must fail");
    assert_eq!(err.kind(), ErrorKind::FederationFailed);
    assert!(err.to_string().contains("ResourceNotFoundException"));

    // The failure aborted the exchange before the second call.
    assert_eq!(stub.call_count(), 1);
    assert!(ContextStore::new().get(&ctx).await.is_err());
}

#[tokio::test]
async fn failed_exchange_leaves_previous_context_in_place() -> anyhow::Result<()> {
    let stub = StubFederation::new();
    stub.push_response(200, TOKEN_RESPONSE);
    stub.push_response(
        200,
        r#"{"IdentityId":"id123","Credentials":{"AccessKeyId":"OLD","SecretKey":"SK","SessionToken":"ST"}}"#,
    );
    let ctx = context_with(&stub);
    let flow = Flow::new();

    let first = flow.run(&ctx, &broker()).await?;
    assert_eq!(first.access_key_id, "OLD");

    // A later run whose second call is rejected must not touch the store.
    stub.push_response(200, TOKEN_RESPONSE);
    stub.push_response(
        400,
        r#"{"__type":"NotAuthorizedException","message":"Invalid login token. Token is expired."}"#,
    );
    let err = flow.run(&ctx, &broker()).await.expect_err("run must fail");
    assert_eq!(err.kind(), ErrorKind::FederationFailed);
    assert!(err.to_string().contains("NotAuthorizedException"));

    assert_eq!(ContextStore::new().get(&ctx).await?.access_key_id, "OLD");

    Ok(())
}

#[tokio::test]
async fn static_keys_sign_the_federation_calls() -> anyhow::Result<()> {
    let stub = StubFederation::new();
    stub.push_response(200, TOKEN_RESPONSE);
    stub.push_response(200, CREDS_RESPONSE);
    let ctx = context_with(&stub);

    let broker = broker().with_static_signing("AKIDSTATIC", "staticsecret");
    Flow::new().run(&ctx, &broker).await?;

    for call in stub.calls() {
        let authorization = call.authorization().expect("call must be signed");
        assert!(authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKIDSTATIC/"));
        assert!(authorization.contains("/cognito-identity/aws4_request"));
        assert!(call.headers.contains_key("x-amz-date"));
        assert_eq!(
            call.headers["host"],
            "cognito-identity.us-west-2.amazonaws.com"
        );
    }

    Ok(())
}
