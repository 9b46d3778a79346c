//! HTTP Basic authentication.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::HeaderMap;
use http::header::AUTHORIZATION;
use twinrpc_json_rpc::Credentials;

/// Realm announced in `WWW-Authenticate` challenges
pub const REALM: &str = "twinrpc";

/// Value for an `Authorization` header carrying `credentials`.
pub fn basic_header(credentials: &Credentials) -> String {
    let token = STANDARD.encode(format!("{}:{}", credentials.username, credentials.password));
    format!("Basic {}", token)
}

/// Whether `headers` carry exactly `credentials`.
pub fn authorize(credentials: &Credentials, headers: &HeaderMap) -> bool {
    let Some(header) = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) else {
        return false;
    };
    let Some((scheme, token)) = header.trim().split_once(' ') else {
        return false;
    };
    if !scheme.eq_ignore_ascii_case("basic") {
        return false;
    }

    let Ok(decoded) = STANDARD.decode(token.trim()) else {
        return false;
    };
    let Ok(decoded) = String::from_utf8(decoded) else {
        return false;
    };
    match decoded.split_once(':') {
        Some((username, password)) => credentials.matches(username, password),
        None => false,
    }
}

/// Challenge sent with a 401.
pub fn challenge() -> String {
    format!("Basic realm=\"{}\"", REALM)
}
