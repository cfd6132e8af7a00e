//! Cognito developer-identity federation and SigV4 request signing.
//!
//! This crate implements the two-stage trust pipeline: an identity claim is
//! exchanged for a provider-scoped identity id and an OpenID token, the
//! token for temporary credentials, and the derived signing context is
//! persisted so outgoing POST requests can be SigV4-signed on their way to
//! a downstream API such as AppSync GraphQL.
//!
//! The external collaborators (HTTP transport, key/value store) come from
//! the [`fedsign_core::Context`]; everything here is deterministic against
//! stub implementations of those capabilities.

mod claim;
pub use claim::ExchangeToken;
pub use claim::IdentityClaim;

mod constants;

mod credential;
pub use credential::CredentialSet;

mod federation;
pub use federation::DeveloperIdentityBroker;

mod flow;
pub use flow::Flow;

mod sign_request;
pub use sign_request::RequestSigner;

mod store;
pub use store::ContextStore;
