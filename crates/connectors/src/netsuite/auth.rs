use crate::netsuite::credentials::Credentials;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use urlencoding::encode;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_METHOD: &str = "HMAC-SHA256";
const OAUTH_VERSION: &str = "1.0";

/// Produces the OAuth 1.0a `Authorization` header for SuiteQL requests.
///
/// The signature base string is `POST&enc(url)&enc(param_string)` where the
/// parameter string is the lexicographically sorted union of the request's
/// query parameters and the fixed oauth parameters, percent-encoded and
/// joined as `key=value` pairs. The digest is HMAC-SHA256 keyed with
/// `enc(consumer_secret)&enc(token_secret)`, base64-encoded.
pub struct RequestSigner {
    credentials: Credentials,
}

impl RequestSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn account(&self) -> &str {
        self.credentials.account()
    }

    /// Signs one outbound request. A fresh nonce and timestamp are drawn per
    /// call; signing itself cannot fail.
    pub fn authorization_header(&self, url: &str, query: &[(&str, &str)]) -> String {
        self.header_for(url, query, &nonce(), unix_timestamp())
    }

    fn header_for(&self, url: &str, query: &[(&str, &str)], nonce: &str, timestamp: u64) -> String {
        let timestamp = timestamp.to_string();
        let oauth_params = [
            ("oauth_consumer_key", self.credentials.consumer_key()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", &timestamp),
            ("oauth_token", self.credentials.token_id()),
            ("oauth_version", OAUTH_VERSION),
        ];

        let mut signature_params: Vec<(&str, &str)> = query.to_vec();
        signature_params.extend(oauth_params);
        signature_params.sort();

        let base_string = base_string(url, &param_string(&signature_params));
        let signature = self.sign(&base_string);

        let mut header = format!(r#"OAuth realm="{}""#, self.credentials.account());
        let header_params = [
            ("oauth_consumer_key", self.credentials.consumer_key()),
            ("oauth_nonce", nonce),
            ("oauth_signature", &signature),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", &timestamp),
            ("oauth_token", self.credentials.token_id()),
            ("oauth_version", OAUTH_VERSION),
        ];
        for (key, value) in header_params {
            header.push_str(&format!(r#", {key}="{}""#, encode(value)));
        }

        header
    }

    fn sign(&self, base_string: &str) -> String {
        let signing_key = format!(
            "{}&{}",
            encode(self.credentials.consumer_secret()),
            encode(self.credentials.token_secret())
        );

        let mut mac = HmacSha256::new_from_slice(signing_key.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(base_string.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

fn param_string(sorted_params: &[(&str, &str)]) -> String {
    sorted_params
        .iter()
        .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn base_string(url: &str, param_string: &str) -> String {
    format!("POST&{}&{}", encode(url), encode(param_string))
}

/// 32 hex characters from the thread-local CSPRNG.
fn nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://acct.suitetalk.api.netsuite.com/services/rest/query/v1/suiteql";

    fn signer() -> RequestSigner {
        let credentials = Credentials::new("acct", "ck", "cs", "tid", "ts").unwrap();
        RequestSigner::new(credentials)
    }

    #[test]
    fn parameter_string_sorts_and_encodes() {
        let params = [
            ("limit", "1000"),
            ("oauth_consumer_key", "ck"),
            ("oauth_nonce", "abc"),
            ("oauth_signature_method", "HMAC-SHA256"),
            ("oauth_timestamp", "1700000000"),
            ("oauth_token", "tid"),
            ("oauth_version", "1.0"),
            ("offset", "0"),
        ];
        assert_eq!(
            param_string(&params),
            "limit=1000&oauth_consumer_key=ck&oauth_nonce=abc\
             &oauth_signature_method=HMAC-SHA256&oauth_timestamp=1700000000\
             &oauth_token=tid&oauth_version=1.0&offset=0"
        );
    }

    #[test]
    fn base_string_encodes_url_and_params() {
        let base = base_string(URL, "a=1&b=2");
        assert_eq!(
            base,
            format!("POST&{}&a%3D1%26b%3D2", urlencoding::encode(URL))
        );
        // The method separator stays literal; everything else is encoded.
        assert_eq!(base.matches('&').count(), 2);
    }

    #[test]
    fn header_is_deterministic_for_fixed_nonce_and_timestamp() {
        let signer = signer();
        let query = [("limit", "1000"), ("offset", "0")];
        let first = signer.header_for(URL, &query, "nonce123", 1_700_000_000);
        let second = signer.header_for(URL, &query, "nonce123", 1_700_000_000);
        assert_eq!(first, second);

        let other_nonce = signer.header_for(URL, &query, "nonce456", 1_700_000_000);
        assert_ne!(first, other_nonce);
    }

    #[test]
    fn header_carries_realm_and_all_oauth_fields() {
        let header = signer().header_for(URL, &[("limit", "5")], "n", 1);
        assert!(header.starts_with(r#"OAuth realm="acct""#));
        for key in [
            "oauth_consumer_key=",
            "oauth_nonce=",
            "oauth_signature=",
            "oauth_signature_method=",
            "oauth_timestamp=",
            "oauth_token=",
            "oauth_version=",
        ] {
            assert!(header.contains(key), "missing {key} in {header}");
        }
    }

    #[test]
    fn signature_is_base64_of_a_sha256_digest() {
        let header = signer().header_for(URL, &[], "n", 1);
        let signature = header
            .split(r#"oauth_signature=""#)
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap();
        let decoded = urlencoding::decode(signature).unwrap();
        let bytes = STANDARD.decode(decoded.as_bytes()).unwrap();
        assert_eq!(bytes.len(), 32);
    }

    #[test]
    fn nonce_is_32_hex_chars_and_unique() {
        let first = nonce();
        let second = nonce();
        assert_eq!(first.len(), 32);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }
}
