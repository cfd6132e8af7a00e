use crate::credential::CredentialSet;
use crate::sign_request::RequestSigner;
use crate::store::ContextStore;
use bytes::Bytes;
use fedsign_core::{Context, Error, ProvideCredential, Result};
use http::request::Parts;
use http::{header, HeaderValue, Method};
use log::{debug, warn};

/// Top-level orchestrator over the exchange and signing paths.
///
/// [`Flow::run`] exchanges an identity claim for credentials and persists
/// the derived signing context; [`Flow::sign_outgoing`] loads that context
/// and injects signature headers into an outgoing request.
#[derive(Debug, Clone, Default)]
pub struct Flow {
    store: ContextStore,
}

impl Flow {
    /// Create a flow over the fixed signing-context store key.
    pub fn new() -> Self {
        Self {
            store: ContextStore::new(),
        }
    }

    /// Create a flow over a custom context store.
    pub fn with_store(store: ContextStore) -> Self {
        Self { store }
    }

    /// Run the exchange and persist the derived signing context.
    ///
    /// The store is only written after the provider returns a complete
    /// credential set; any earlier failure leaves the previous context in
    /// place and propagates to the caller. Nothing is retried.
    pub async fn run<P>(&self, ctx: &Context, provider: &P) -> Result<CredentialSet>
    where
        P: ProvideCredential<Credential = CredentialSet>,
    {
        let set = provider
            .provide_credential(ctx)
            .await
            .map_err(|e| {
                warn!("credential exchange failed: {e}");
                e
            })?
            .ok_or_else(|| {
                Error::federation_failed("federation provider returned no credentials")
            })?;

        self.store.put(ctx, &set).await?;
        debug!("persisted signing context for {}/{}", set.region, set.service);

        Ok(set)
    }

    /// Sign an outgoing request against the persisted signing context.
    ///
    /// The context is loaded first; an absent or malformed context is an
    /// error ("run the exchange first"). Only POST requests receive
    /// signature headers; other methods pass through untouched. This is
    /// the documented policy for the GraphQL consumer, where every
    /// state-changing call goes over POST.
    pub async fn sign_outgoing(&self, ctx: &Context, parts: &mut Parts, body: &Bytes) -> Result<()> {
        let set = self.store.get(ctx).await?;

        if parts.method != Method::POST {
            debug!("{} request passes through unsigned", parts.method);
            return Ok(());
        }

        // The content type participates in the signature, so a missing one
        // is fixed up before signing rather than after.
        if !parts.headers.contains_key(header::CONTENT_TYPE) {
            parts.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }

        RequestSigner::new(&set.service, &set.region).sign(parts, body, &set)
    }
}
