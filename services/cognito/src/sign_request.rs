use crate::constants::{QUERY_ENCODE_SET, URI_ENCODE_SET, X_AMZ_DATE, X_AMZ_SECURITY_TOKEN};
use crate::credential::CredentialSet;
use bytes::Bytes;
use fedsign_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use fedsign_core::time::{format_date, format_iso8601, now, DateTime};
use fedsign_core::{Error, Result, SigningRequest};
use http::request::Parts;
use http::{header, HeaderValue};
use log::debug;
use percent_encoding::utf8_percent_encode;
use std::fmt::Write;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// RequestSigner that implements AWS SigV4 header signing.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// Pure given its inputs: one timestamp per invocation feeds the date
/// header, the credential scope, and the string to sign; the credential is
/// borrowed read-only.
#[derive(Debug)]
pub struct RequestSigner {
    service: String,
    region: String,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new SigV4 signer for the given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),

            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign the request and inject the signature headers.
    ///
    /// The body is treated as opaque bytes; its SHA-256 becomes the payload
    /// hash of the canonical request. An empty body hashes to the digest of
    /// the empty string.
    pub fn sign(&self, parts: &mut Parts, body: &Bytes, cred: &CredentialSet) -> Result<()> {
        let now = self.time.unwrap_or_else(now);
        let mut signed_req = SigningRequest::build(parts, body.clone())?;

        canonicalize_header(&mut signed_req, cred, now)?;
        canonicalize_query(&mut signed_req);

        let creq = canonical_request_string(&signed_req)?;
        let scope = credential_scope(now, &self.region, &self.service);
        debug!("calculated scope: {scope}");

        let string_to_sign = string_to_sign(&creq, now, &scope)?;
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key =
            generate_signing_key(&cred.secret_access_key, now, &self.region, &self.service);
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let mut authorization = HeaderValue::from_str(&format!(
            "{ALGORITHM} Credential={}/{}, SignedHeaders={}, Signature={}",
            cred.access_key_id,
            scope,
            signed_req.header_name_to_vec_sorted().join(";"),
            signature
        ))?;
        authorization.set_sensitive(true);
        signed_req
            .headers
            .insert(header::AUTHORIZATION, authorization);

        // Apply to the request.
        signed_req.apply(parts)
    }
}

fn canonicalize_header(
    ctx: &mut SigningRequest,
    cred: &CredentialSet,
    now: DateTime,
) -> Result<()> {
    // Header values are trimmed of surrounding whitespace before they
    // participate in the canonical request.
    for (_, value) in ctx.headers.iter_mut() {
        SigningRequest::header_value_normalize(value)
    }

    // Insert HOST header if not present.
    if ctx.headers.get(header::HOST).is_none() {
        if let Some(authority) = &ctx.authority {
            ctx.headers.insert(header::HOST, authority.as_str().parse()?);
        }
    }
    // Cannot sign without a target host.
    if ctx.headers.get(header::HOST).is_none() {
        return Err(Error::request_invalid(
            "cannot sign a request without a target host",
        ));
    }

    // The date header always carries this invocation's timestamp, so header,
    // scope, and string to sign agree even if the caller preset a date.
    ctx.headers
        .insert(X_AMZ_DATE, HeaderValue::try_from(format_iso8601(now))?);

    // Insert X_AMZ_SECURITY_TOKEN header when the credential carries a
    // session token.
    if !cred.session_token.is_empty() {
        let mut value = HeaderValue::from_str(&cred.session_token)?;
        // Set token value sensitive to avoid leaking.
        value.set_sensitive(true);

        ctx.headers.insert(X_AMZ_SECURITY_TOKEN, value);
    }

    Ok(())
}

fn canonicalize_query(ctx: &mut SigningRequest) {
    if ctx.query.is_empty() {
        return;
    }

    // Sort by param name, ties broken by value, in ascending byte order.
    ctx.query.sort();

    ctx.query = ctx
        .query
        .iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, &QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(v, &QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect();
}

fn canonical_request_string(ctx: &SigningRequest) -> Result<String> {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    // Insert method
    writeln!(f, "{}", ctx.method)?;
    // Insert encoded path. The caller supplies per-segment encoding; dot
    // segments are not collapsed here.
    let path = ctx.path_percent_decoded();
    writeln!(f, "{}", utf8_percent_encode(&path, &URI_ENCODE_SET))?;
    // Insert query, already sorted and encoded.
    writeln!(
        f,
        "{}",
        ctx.query
            .iter()
            .map(|(k, v)| { format!("{k}={v}") })
            .collect::<Vec<_>>()
            .join("&")
    )?;
    // Insert signed headers
    let signed_headers = ctx.header_name_to_vec_sorted();
    for header in signed_headers.iter() {
        let value = ctx.headers[*header].to_str()?;
        writeln!(f, "{header}:{value}")?;
    }
    writeln!(f)?;
    writeln!(f, "{}", signed_headers.join(";"))?;
    // Payload hash over the body bytes.
    write!(f, "{}", hex_sha256(&ctx.body))?;

    Ok(f)
}

/// Scope: "20220313/<region>/<service>/aws4_request"
fn credential_scope(now: DateTime, region: &str, service: &str) -> String {
    format!("{}/{}/{}/aws4_request", format_date(now), region, service)
}

/// StringToSign:
///
/// ```text
/// AWS4-HMAC-SHA256
/// 20220313T072004Z
/// 20220313/<region>/<service>/aws4_request
/// <hashed_canonical_request>
/// ```
fn string_to_sign(creq: &str, now: DateTime, scope: &str) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "{ALGORITHM}")?;
    writeln!(f, "{}", format_iso8601(now))?;
    writeln!(f, "{scope}")?;
    write!(f, "{}", hex_sha256(creq.as_bytes()))?;

    Ok(f)
}

fn generate_signing_key(secret: &str, time: DateTime, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), "aws4_request".as_bytes())
}
