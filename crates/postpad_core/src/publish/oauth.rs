//! OAuth 1.0a HMAC-SHA1 request signing.

use super::XCredentials;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;

const NONCE_CHARS: usize = 32;

type HmacSha1 = Hmac<Sha1>;

pub(crate) fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_CHARS)
        .map(char::from)
        .collect()
}

/// Builds the `Authorization` header value for one request.
///
/// `params` are query/form parameters that take part in the signature; JSON
/// bodies do not.
pub(crate) fn authorization_header(
    credentials: &XCredentials,
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    nonce: &str,
    timestamp: i64,
) -> String {
    let timestamp = timestamp.to_string();
    let mut oauth_params = vec![
        ("oauth_consumer_key", credentials.api_key.as_str()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp.as_str()),
        ("oauth_token", credentials.access_token.as_str()),
        ("oauth_version", "1.0"),
    ];

    let mut all_params = oauth_params.clone();
    all_params.extend_from_slice(params);
    let base = signature_base_string(method, url, &all_params);
    let signature = sign(&base, &credentials.api_secret, &credentials.access_secret);

    oauth_params.push(("oauth_signature", signature.as_str()));
    oauth_params.sort();
    let fields = oauth_params
        .iter()
        .map(|(key, value)| format!("{}=\"{}\"", encode(key), encode(value)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("OAuth {fields}")
}

fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded = params
        .iter()
        .map(|(key, value)| (encode(key), encode(value)))
        .collect::<Vec<_>>();
    encoded.sort();
    let param_string = encoded
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&param_string)
    )
}

fn sign(base: &str, consumer_secret: &str, token_secret: &str) -> String {
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));
    // HMAC accepts keys of any length, so this cannot fail.
    let mut mac = match HmacSha1::new_from_slice(key.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(base.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// RFC 3986 percent-encoding (unreserved: `A-Z a-z 0-9 - . _ ~`).
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::{authorization_header, generate_nonce, sign, signature_base_string};
    use crate::publish::XCredentials;

    fn credentials(secret: &str) -> XCredentials {
        XCredentials {
            api_key: "consumer-key".into(),
            api_secret: secret.into(),
            access_token: "token".into(),
            access_secret: "token-secret".into(),
        }
    }

    #[test]
    fn base_string_sorts_and_double_encodes_params() {
        let base = signature_base_string(
            "post",
            "https://api.twitter.com/2/tweets",
            &[("b", "2 3"), ("a", "x+y")],
        );
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F2%2Ftweets&a%3Dx%252By%26b%3D2%25203"
        );
    }

    #[test]
    fn header_lists_every_oauth_field() {
        let header = authorization_header(
            &credentials("secret"),
            "POST",
            "https://api.twitter.com/2/tweets",
            &[],
            "abc123",
            1_700_000_000,
        );
        assert!(header.starts_with("OAuth "));
        for field in [
            "oauth_consumer_key=\"consumer-key\"",
            "oauth_nonce=\"abc123\"",
            "oauth_signature_method=\"HMAC-SHA1\"",
            "oauth_timestamp=\"1700000000\"",
            "oauth_token=\"token\"",
            "oauth_version=\"1.0\"",
            "oauth_signature=\"",
        ] {
            assert!(header.contains(field), "missing {field} in {header}");
        }
    }

    #[test]
    fn signature_is_deterministic_and_secret_bound() {
        let first = sign("base", "a", "b");
        assert_eq!(first, sign("base", "a", "b"));
        assert_ne!(first, sign("base", "c", "b"));
        // Base64 of a 20-byte SHA-1 MAC.
        assert_eq!(first.len(), 28);
    }

    #[test]
    fn nonce_is_alphanumeric() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
