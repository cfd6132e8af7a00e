use fedsign_core::utils::Redact;
use fedsign_core::{Error, Result};
use std::fmt::{Debug, Formatter};

/// The end-user identity presented to the federation provider.
///
/// Lives only for the duration of one exchange; never persisted. The
/// password authenticates the user against the host's own backend and is
/// not forwarded to the provider; the login map carries the user identity
/// under the developer provider's name.
#[derive(Clone)]
pub struct IdentityClaim {
    /// Opaque user identity issued by the host's backend.
    pub user_identity: String,
    /// The user's password; required, validated, never sent on the wire.
    pub password: String,
    /// Identity pool accepting this developer provider.
    pub identity_pool_id: String,
    /// Registered developer provider name, e.g. `login.example.com`.
    pub developer_provider: String,
}

impl IdentityClaim {
    /// Create a new IdentityClaim.
    pub fn new(
        user_identity: impl Into<String>,
        password: impl Into<String>,
        identity_pool_id: impl Into<String>,
        developer_provider: impl Into<String>,
    ) -> Self {
        Self {
            user_identity: user_identity.into(),
            password: password.into(),
            identity_pool_id: identity_pool_id.into(),
            developer_provider: developer_provider.into(),
        }
    }

    /// Check that every field is present, naming the first missing one.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("user_identity", &self.user_identity),
            ("password", &self.password),
            ("identity_pool_id", &self.identity_pool_id),
            ("developer_provider", &self.developer_provider),
        ];

        for (name, value) in fields {
            if value.is_empty() {
                return Err(Error::claim_invalid(format!("{name} must not be empty")));
            }
        }

        Ok(())
    }
}

impl Debug for IdentityClaim {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityClaim")
            .field("user_identity", &self.user_identity)
            .field("password", &Redact::from(&self.password))
            .field("identity_pool_id", &self.identity_pool_id)
            .field("developer_provider", &self.developer_provider)
            .finish()
    }
}

/// The provider-scoped identity produced by the first federation call.
///
/// Single-use: consumed immediately by the credentials exchange. Tokens are
/// short-lived and carry no expiry here; re-running the flow is the only
/// refresh path.
#[derive(Clone)]
pub struct ExchangeToken {
    /// Provider-scoped identity id.
    pub identity_id: String,
    /// The OpenID token to trade for credentials.
    pub token: String,
}

impl Debug for ExchangeToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeToken")
            .field("identity_id", &self.identity_id)
            .field("token", &Redact::from(&self.token))
            .finish()
    }
}
