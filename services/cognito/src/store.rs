use crate::constants::SIGNING_CONTEXT_KEY;
use crate::credential::CredentialSet;
use fedsign_core::{Context, Error, Result, SigningCredential};

/// Persistence boundary for the derived signing context.
///
/// The backing store enforces no schema and may change between writes, so
/// every read revalidates the decoded set. Writes are all-or-nothing: a set
/// that is not fully populated is refused before it reaches the store.
#[derive(Debug, Clone)]
pub struct ContextStore {
    key: String,
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextStore {
    /// Create a store over the fixed signing-context key.
    pub fn new() -> Self {
        Self {
            key: SIGNING_CONTEXT_KEY.to_string(),
        }
    }

    /// Create a store over a caller-chosen key, e.g. one per session.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// The key this store reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Persist a fully populated credential set, replacing any previous one
    /// wholesale.
    pub async fn put(&self, ctx: &Context, set: &CredentialSet) -> Result<()> {
        if !set.is_valid() {
            return Err(Error::store_invalid(
                "refusing to persist a partially populated credential set",
            ));
        }

        let encoded = serde_json::to_string(set)
            .map_err(|e| Error::unexpected("failed to encode credential set").with_source(e))?;
        ctx.store_set(&self.key, &encoded).await
    }

    /// Load and revalidate the persisted credential set.
    pub async fn get(&self, ctx: &Context) -> Result<CredentialSet> {
        let raw = ctx.store_get(&self.key).await?.ok_or_else(|| {
            Error::store_invalid(format!(
                "no signing context under key {}: run the exchange first",
                self.key
            ))
        })?;

        let set: CredentialSet = serde_json::from_str(&raw)
            .map_err(|e| Error::store_invalid("malformed signing context").with_source(e))?;
        if !set.is_valid() {
            return Err(Error::store_invalid(
                "signing context is missing required fields",
            ));
        }

        Ok(set)
    }
}
