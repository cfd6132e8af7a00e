use crate::{Context, Result};
use std::fmt::Debug;

/// SigningCredential is the contract a credential must satisfy before it may
/// be persisted or used for signing.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential is fully populated and usable.
    fn is_valid(&self) -> bool;
}

/// ProvideCredential is the seam between the signing flow and whatever
/// produces credentials.
///
/// A provider may talk to a federation service over the wire, or return a
/// fixed credential for tests. The flow only sees this interface, so any
/// implementation is substitutable.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + Unpin + 'static {
    /// Credential returned by this provider.
    type Credential: Send + Sync + Unpin + 'static;

    /// Produce a credential, or `None` if this provider has nothing to offer.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}
