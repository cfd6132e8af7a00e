use crate::claim::{ExchangeToken, IdentityClaim};
use crate::constants::{
    AMZ_JSON_CONTENT_TYPE, COGNITO_LOGIN_DOMAIN, COGNITO_SERVICE, TARGET_GET_CREDENTIALS,
    TARGET_GET_OPEN_ID_TOKEN, X_AMZ_TARGET,
};
use crate::credential::CredentialSet;
use crate::sign_request::RequestSigner;
use async_trait::async_trait;
use bytes::Bytes;
use fedsign_core::utils::Redact;
use fedsign_core::{Context, Error, ProvideCredential, Result};
use http::{header, Method, Request, StatusCode};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

/// Static access keys used to sign the federation calls themselves.
#[derive(Clone)]
struct StaticSigningKeys {
    access_key_id: String,
    secret_access_key: String,
}

impl Debug for StaticSigningKeys {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSigningKeys")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .finish()
    }
}

/// Credential broker for Cognito developer-authenticated identities.
///
/// Converts an [`IdentityClaim`] into a provider-scoped identity id plus an
/// OpenID token, then trades that token for temporary credentials. The two
/// calls are strictly sequential and nothing is retried: any failure aborts
/// the whole exchange and surfaces the provider's raw error payload.
///
/// # Usage
/// ```rust,no_run
/// use fedsign_cognito::{DeveloperIdentityBroker, IdentityClaim};
///
/// let claim = IdentityClaim::new("user-id", "password", "us-west-2:pool", "login.example.com");
/// let broker = DeveloperIdentityBroker::new(claim, "us-west-2", "appsync");
/// ```
#[derive(Debug, Clone)]
pub struct DeveloperIdentityBroker {
    claim: IdentityClaim,
    region: String,
    service: String,
    static_keys: Option<StaticSigningKeys>,
}

impl DeveloperIdentityBroker {
    /// Create a broker for the given claim, region, and target service.
    pub fn new(claim: IdentityClaim, region: &str, service: &str) -> Self {
        Self {
            claim,
            region: region.to_string(),
            service: service.to_string(),
            static_keys: None,
        }
    }

    /// Sign the federation calls with static access keys.
    ///
    /// Without this, the calls go out unsigned, which the enhanced identity
    /// flow accepts for pools configured that way.
    pub fn with_static_signing(mut self, access_key_id: &str, secret_access_key: &str) -> Self {
        self.static_keys = Some(StaticSigningKeys {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
        });
        self
    }

    fn endpoint(&self) -> String {
        format!("https://cognito-identity.{}.amazonaws.com/", self.region)
    }

    async fn call(&self, ctx: &Context, target: &str, body: serde_json::Value) -> Result<Bytes> {
        let body = Bytes::from(
            serde_json::to_vec(&body)
                .map_err(|e| Error::unexpected("failed to serialize request body").with_source(e))?,
        );

        let req = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint())
            .header(X_AMZ_TARGET, target)
            .header(header::CONTENT_TYPE, AMZ_JSON_CONTENT_TYPE)
            .body(body)?;

        let req = match &self.static_keys {
            Some(keys) => {
                let (mut parts, body) = req.into_parts();
                let cred = CredentialSet {
                    region: self.region.clone(),
                    service: COGNITO_SERVICE.to_string(),
                    access_key_id: keys.access_key_id.clone(),
                    secret_access_key: keys.secret_access_key.clone(),
                    session_token: String::new(),
                };
                RequestSigner::new(COGNITO_SERVICE, &self.region).sign(&mut parts, &body, &cred)?;
                Request::from_parts(parts, body)
            }
            None => req,
        };

        let resp = ctx
            .http_send(req)
            .await
            .map_err(|e| Error::federation_failed(format!("{target} call failed")).with_source(e))?;

        if resp.status() != StatusCode::OK {
            let status = resp.status();
            let payload = String::from_utf8_lossy(resp.body()).into_owned();
            warn!("federation provider rejected {target}: status {status}, payload: {payload}");
            return Err(Error::federation_failed(format!(
                "{target} returned status {status}: {payload}"
            )));
        }

        Ok(resp.into_body())
    }

    /// Exchange the claim for a provider-scoped identity id and OpenID token.
    pub async fn exchange_identity(&self, ctx: &Context) -> Result<ExchangeToken> {
        let logins = HashMap::from([(
            self.claim.developer_provider.as_str(),
            self.claim.user_identity.as_str(),
        )]);
        let body = json!({
            "IdentityPoolId": self.claim.identity_pool_id.as_str(),
            "Logins": logins
        });

        let payload = self.call(ctx, TARGET_GET_OPEN_ID_TOKEN, body).await?;
        let resp: GetOpenIdTokenResponse = serde_json::from_slice(&payload).map_err(|e| {
            Error::federation_failed("failed to parse GetOpenIdTokenForDeveloperIdentity response")
                .with_source(e)
        })?;

        Ok(ExchangeToken {
            identity_id: resp.identity_id,
            token: resp.token,
        })
    }

    /// Trade a single-use exchange token for temporary credentials.
    ///
    /// Region and service are left unset here; the flow stamps them before
    /// the set is persisted.
    pub async fn exchange_credentials(
        &self,
        ctx: &Context,
        token: ExchangeToken,
    ) -> Result<CredentialSet> {
        let ExchangeToken { identity_id, token } = token;
        let logins = HashMap::from([(COGNITO_LOGIN_DOMAIN, token.as_str())]);
        let body = json!({
            "IdentityId": identity_id,
            "Logins": logins
        });

        let payload = self.call(ctx, TARGET_GET_CREDENTIALS, body).await?;
        let resp: GetCredentialsResponse = serde_json::from_slice(&payload).map_err(|e| {
            Error::federation_failed("failed to parse GetCredentialsForIdentity response")
                .with_source(e)
        })?;

        Ok(CredentialSet {
            region: String::new(),
            service: String::new(),
            access_key_id: resp.credentials.access_key_id,
            secret_access_key: resp.credentials.secret_key,
            session_token: resp.credentials.session_token,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetOpenIdTokenResponse {
    identity_id: String,
    token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetCredentialsResponse {
    credentials: FederatedCredentials,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FederatedCredentials {
    access_key_id: String,
    secret_key: String,
    session_token: String,
}

#[async_trait]
impl ProvideCredential for DeveloperIdentityBroker {
    type Credential = CredentialSet;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.claim.validate()?;
        if self.region.is_empty() {
            return Err(Error::claim_invalid("region must not be empty"));
        }
        if self.service.is_empty() {
            return Err(Error::claim_invalid("service must not be empty"));
        }

        let token = self.exchange_identity(ctx).await?;
        debug!("federated identity id: {}", token.identity_id);

        let mut set = self.exchange_credentials(ctx, token).await?;
        set.region = self.region.clone();
        set.service = self.service.clone();

        Ok(Some(set))
    }
}
