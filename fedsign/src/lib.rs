//! Federated identity exchange and request signing without effort.
//!
//! fedsign turns an end-user identity/password pair into temporary
//! AWS-style credentials via Cognito developer-authenticated identities,
//! persists the derived signing context in a pluggable key/value store, and
//! SigV4-signs outgoing POST requests with it, so a downstream API such as
//! an AppSync GraphQL endpoint can verify authenticity without ever seeing
//! a long-lived secret.
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use fedsign::{run_exchange, sign_outgoing, Context, ExchangeParams};
//! use fedsign::{MemoryKvStore, ReqwestHttpSend};
//!
//! # async fn example() -> fedsign::Result<()> {
//! let ctx = Context::new()
//!     .with_http_send(ReqwestHttpSend::default())
//!     .with_kv_store(MemoryKvStore::new());
//!
//! // Once, on user action: exchange credentials and persist them.
//! let persisted = run_exchange(
//!     &ctx,
//!     ExchangeParams {
//!         user_identity: "19257053143:0094a8d7".to_string(),
//!         password: "secret".to_string(),
//!         identity_pool_id: "us-west-2:e140dd9a-1219-4678-ab65-eee8530a99bd".to_string(),
//!         developer_provider: "login.example.com".to_string(),
//!         region: "us-west-2".to_string(),
//!         service: "appsync".to_string(),
//!         ..Default::default()
//!     },
//! )
//! .await?;
//! println!("signing context: {persisted}");
//!
//! // Later, per outgoing request: inject the signature headers.
//! let body = Bytes::from_static(br#"{"query":"{ viewer { id } }"}"#);
//! let (mut parts, _) = http::Request::builder()
//!     .method(http::Method::POST)
//!     .uri("https://example.appsync-api.us-west-2.amazonaws.com/graphql")
//!     .body(())
//!     .expect("request must build")
//!     .into_parts();
//! sign_outgoing(&ctx, &mut parts, &body).await?;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

use bytes::Bytes;
use std::fmt::{Debug, Formatter};

pub use fedsign_cognito::{
    ContextStore, CredentialSet, DeveloperIdentityBroker, ExchangeToken, Flow, IdentityClaim,
    RequestSigner,
};
pub use fedsign_core::{Context, Error, ErrorKind, HttpSend, KvStore, Result};
pub use fedsign_http_send_reqwest::ReqwestHttpSend;
pub use fedsign_store_memory::MemoryKvStore;

use fedsign_core::utils::Redact;

/// Inputs for one run of the credential exchange.
#[derive(Clone, Default)]
pub struct ExchangeParams {
    /// Opaque user identity issued by the host's backend.
    pub user_identity: String,
    /// The user's password.
    pub password: String,
    /// Identity pool accepting the developer provider.
    pub identity_pool_id: String,
    /// Registered developer provider name, e.g. `login.example.com`.
    pub developer_provider: String,
    /// Region to federate and sign in.
    pub region: String,
    /// Service the signature binds to, e.g. `appsync`.
    pub service: String,
    /// Static access key used to sign the federation calls.
    ///
    /// Empty or absent means the calls go out unsigned.
    pub access_key_id: Option<String>,
    /// Static secret access key, paired with `access_key_id`.
    pub secret_access_key: Option<String>,
}

impl Debug for ExchangeParams {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeParams")
            .field("user_identity", &self.user_identity)
            .field("password", &Redact::from(&self.password))
            .field("identity_pool_id", &self.identity_pool_id)
            .field("developer_provider", &self.developer_provider)
            .field("region", &self.region)
            .field("service", &self.service)
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .finish()
    }
}

fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Run the exchange and return the persisted signing context as JSON.
///
/// Validates the claim, performs the two federation calls in sequence, and
/// persists the derived credential set wholesale. Any failure propagates
/// without touching the store.
pub async fn run_exchange(ctx: &Context, params: ExchangeParams) -> Result<String> {
    let claim = IdentityClaim::new(
        params.user_identity.as_str(),
        params.password.as_str(),
        params.identity_pool_id.as_str(),
        params.developer_provider.as_str(),
    );

    let mut broker = DeveloperIdentityBroker::new(claim, &params.region, &params.service);
    if let (Some(ak), Some(sk)) = (
        supplied(&params.access_key_id),
        supplied(&params.secret_access_key),
    ) {
        broker = broker.with_static_signing(ak, sk);
    }

    let set = Flow::new().run(ctx, &broker).await?;
    serde_json::to_string(&set)
        .map_err(|e| Error::unexpected("failed to encode credential set").with_source(e))
}

/// Per-request hook: sign an outgoing request with the persisted context.
///
/// Only POST requests receive signature headers; other methods pass through
/// untouched. Fails when no exchange has succeeded yet.
pub async fn sign_outgoing(
    ctx: &Context,
    parts: &mut http::request::Parts,
    body: &Bytes,
) -> Result<()> {
    Flow::new().sign_outgoing(ctx, parts, body).await
}
