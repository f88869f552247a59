//! Basic-Auth credential verification against the credential store.

use crate::services::CredentialStore;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use service_core::error::AppError;
use service_core::utils::digest;

const BASIC_SCHEME: &str = "Basic ";

/// Identity attached to a request once its credentials check out.
#[derive(Debug, Clone)]
pub struct Principal {
    pub client_id: String,
}

fn unauthorized(reason: &'static str) -> AppError {
    AppError::Unauthorized(anyhow::anyhow!(reason))
}

/// Split a `Basic <base64(clientId:clientSecret)>` header value into its
/// parts. Any structural problem yields `None`.
fn decode_basic_credentials(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix(BASIC_SCHEME)?;
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (client_id, client_secret) = decoded.split_once(':')?;
    if client_id.is_empty() || client_secret.is_empty() {
        return None;
    }
    Some((client_id.to_string(), client_secret.to_string()))
}

/// Verify the `Authorization` header against the credential store.
///
/// Every failure collapses to the same `Unauthorized` outcome; which step
/// failed is visible only in the server logs.
pub async fn authorize(
    credentials: &dyn CredentialStore,
    header: Option<&str>,
) -> Result<Principal, AppError> {
    let header = header.ok_or_else(|| unauthorized("missing Authorization header"))?;
    let (client_id, client_secret) =
        decode_basic_credentials(header).ok_or_else(|| unauthorized("malformed Basic token"))?;

    let supplied_digest = digest::sha256_hex(&client_secret);

    let credential = credentials
        .find_by_client_id(&client_id)
        .await?
        .ok_or_else(|| unauthorized("unknown client"))?;

    if !credential.is_usable(Utc::now()) {
        return Err(unauthorized("client inactive or expired"));
    }

    if !digest::digests_match(&credential.client_secret_hash, &supplied_digest) {
        return Err(unauthorized("client secret mismatch"));
    }

    Ok(Principal { client_id })
}
