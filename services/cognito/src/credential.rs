use fedsign_core::utils::Redact;
use fedsign_core::SigningCredential;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

/// The signing context derived from one successful exchange.
///
/// This is also the persisted JSON shape: one object, camelCase keys,
/// written wholesale under a fixed store key. All five fields must be
/// non-empty before the set may be persisted or used for signing.
#[derive(Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSet {
    /// Region the credentials were issued for.
    pub region: String,
    /// Service the signature binds to, e.g. `appsync`.
    pub service: String,
    /// Access key id of the temporary credentials.
    pub access_key_id: String,
    /// Secret access key of the temporary credentials.
    pub secret_access_key: String,
    /// Session token of the temporary credentials.
    pub session_token: String,
}

impl Debug for CredentialSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSet")
            .field("region", &self.region)
            .field("service", &self.service)
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .finish()
    }
}

impl SigningCredential for CredentialSet {
    fn is_valid(&self) -> bool {
        !self.region.is_empty()
            && !self.service.is_empty()
            && !self.access_key_id.is_empty()
            && !self.secret_access_key.is_empty()
            && !self.session_token.is_empty()
    }
}
