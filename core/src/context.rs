use crate::{Error, Result};
use bytes::Bytes;
use std::fmt::Debug;
use std::sync::Arc;

/// Context provides the external collaborators for the exchange and signing
/// flows: an HTTP transport and a string-keyed key/value store.
///
/// ## Important
///
/// fedsign provides NO default implementations. Users MAY configure the
/// capabilities they need. Any unconfigured capability uses a no-op
/// implementation that returns errors when called.
///
/// ## Example
///
/// ```ignore
/// use fedsign_core::Context;
///
/// let ctx = Context::new()
///     .with_http_send(my_http_client)
///     .with_kv_store(my_store);
/// ```
#[derive(Clone)]
pub struct Context {
    http: Arc<dyn HttpSend>,
    store: Arc<dyn KvStore>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("http", &self.http)
            .field("store", &self.store)
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a new Context with no-op implementations.
    pub fn new() -> Self {
        Self {
            http: Arc::new(NoopHttpSend),
            store: Arc::new(NoopKvStore),
        }
    }

    /// Replace the HTTP client implementation.
    pub fn with_http_send(mut self, http: impl HttpSend) -> Self {
        self.http = Arc::new(http);
        self
    }

    /// Replace the key/value store implementation.
    pub fn with_kv_store(mut self, store: impl KvStore) -> Self {
        self.store = Arc::new(store);
        self
    }

    /// Send http request and return the response.
    #[inline]
    pub async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.http.http_send(req).await
    }

    /// Fetch the value stored under `key`, or `None` if the key is absent.
    #[inline]
    pub async fn store_get(&self, key: &str) -> Result<Option<String>> {
        self.store.get_item(key).await
    }

    /// Store `value` under `key`, replacing any previous value wholesale.
    #[inline]
    pub async fn store_set(&self, key: &str, value: &str) -> Result<()> {
        self.store.set_item(key, value).await
    }
}

/// HttpSend is used to send http requests during the credential exchange.
///
/// This trait is designed especially for the federation calls, please don't
/// use it as a general http client. Implementations are expected to bound
/// each request with a timeout; a timed-out call surfaces as an error.
#[async_trait::async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send http request and return the response.
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>>;
}

/// KvStore is the persistence collaborator for the derived signing context.
///
/// The store enforces no schema; values are whatever the caller encoded.
/// Readers must revalidate on every `get_item`.
#[async_trait::async_trait]
pub trait KvStore: Debug + Send + Sync + 'static {
    /// Fetch the value stored under `key`, or `None` if the key is absent.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value wholesale.
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// NoopHttpSend is a no-op implementation that always returns an error.
///
/// This is used when no HTTP client is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpSend;

#[async_trait::async_trait]
impl HttpSend for NoopHttpSend {
    async fn http_send(&self, _req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        Err(Error::unexpected(
            "HTTP sending not supported: no HTTP client configured",
        ))
    }
}

/// NoopKvStore is a no-op implementation that always returns an error.
///
/// This is used when no key/value store is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopKvStore;

#[async_trait::async_trait]
impl KvStore for NoopKvStore {
    async fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::unexpected(
            "key/value storage not supported: no store configured",
        ))
    }

    async fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
        Err(Error::unexpected(
            "key/value storage not supported: no store configured",
        ))
    }
}
