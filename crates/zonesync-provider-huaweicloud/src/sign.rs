//! SDK-HMAC-SHA256 request signing
//!
//! Reference: <https://support.huaweicloud.com/devg-apisign/api-sign-algorithm-005.html>

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt::Write;
use zonesync_core::{Error, Result};

use super::HuaweiCloudProvider;

type HmacSha256 = Hmac<Sha256>;

/// Signing algorithm name, also the Authorization scheme
const ALGORITHM: &str = "SDK-HMAC-SHA256";

/// `X-Sdk-Date` timestamp format
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| Error::Other(format!("HMAC key rejected: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

impl HuaweiCloudProvider {
    /// Build the Authorization header value for one request
    ///
    /// `headers` are the headers being signed; every one of them must be sent
    /// with the request unchanged.
    pub(crate) fn sign(
        &self,
        method: &str,
        uri: &str,
        query: &str,
        headers: &[(&str, &str)],
        payload: &str,
        timestamp: &str,
    ) -> Result<String> {
        // Canonical URI always ends with "/"
        let canonical_uri = if uri.ends_with('/') {
            uri.to_string()
        } else {
            format!("{}/", uri)
        };

        let canonical_query = if query.is_empty() {
            String::new()
        } else {
            let mut params: Vec<&str> = query.split('&').collect();
            params.sort_unstable();
            params.join("&")
        };

        let mut sorted_headers: Vec<(String, &str)> = headers
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.trim()))
            .collect();
        sorted_headers.sort_by(|a, b| a.0.cmp(&b.0));

        let canonical_headers = sorted_headers
            .iter()
            .fold(String::new(), |mut acc, (k, v)| {
                let _ = writeln!(acc, "{}:{}", k, v);
                acc
            });

        let signed_headers = sorted_headers
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";");

        let hashed_payload = hex::encode(Sha256::digest(payload.as_bytes()));

        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            method, canonical_uri, canonical_query, canonical_headers, signed_headers, hashed_payload
        );
        tracing::trace!("Canonical request:\n{}", canonical_request);

        let hashed_canonical_request = hex::encode(Sha256::digest(canonical_request.as_bytes()));
        let string_to_sign = format!("{}\n{}\n{}", ALGORITHM, timestamp, hashed_canonical_request);

        let signature = hex::encode(hmac_sha256(
            self.secret_access_key.as_bytes(),
            string_to_sign.as_bytes(),
        )?);

        Ok(format!(
            "{} Access={}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.access_key_id, signed_headers, signature
        ))
    }
}
