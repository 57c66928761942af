//! HTTP side of the token check.
//!
//! Reads the configured credential header, runs the core `authorize`
//! decision against a snapshot, and writes the verdict header. Non-UTF-8
//! header bytes resolve to unauthorized; when the header is repeated only the
//! first value is checked.

pub mod check;
pub mod middleware;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use tokengate_core::error::{Result, TokenGateError};
use tokengate_core::{authorize, AuthorizationResult, TokenSnapshot};

use crate::config::AuthConfig;

/// Resolved header names.
#[derive(Debug, Clone)]
pub struct AuthHeaders {
    /// Inbound credential header.
    pub token: HeaderName,
    /// Outbound verdict header.
    pub verdict: HeaderName,
}

impl AuthHeaders {
    pub fn from_config(cfg: &AuthConfig) -> Result<Self> {
        let parse = |name: &str| {
            HeaderName::try_from(name)
                .map_err(|_| TokenGateError::BadRequest(format!("invalid header name: {name}")))
        };
        Ok(Self {
            token: parse(&cfg.token_header)?,
            verdict: parse(&cfg.token_valid_header)?,
        })
    }
}

/// Decision plus whether the credential header was sent at all.
#[derive(Debug, Clone)]
pub struct HeaderCheck {
    pub result: AuthorizationResult,
    pub header_present: bool,
}

impl HeaderCheck {
    /// Metric label for this decision.
    pub fn label(&self) -> &'static str {
        match (self.header_present, self.result.authorized) {
            (false, _) => "missing",
            (true, true) => "granted",
            (true, false) => "denied",
        }
    }
}

pub fn authorize_headers(headers: &HeaderMap, names: &AuthHeaders, snapshot: &TokenSnapshot) -> HeaderCheck {
    let Some(value) = headers.get(&names.token) else {
        return HeaderCheck {
            result: AuthorizationResult::denied(),
            header_present: false,
        };
    };

    let result = match std::str::from_utf8(value.as_bytes()) {
        Ok(v) => authorize(Some(v), snapshot),
        Err(_) => AuthorizationResult::denied(),
    };
    HeaderCheck {
        result,
        header_present: true,
    }
}

/// Set the verdict header, only when a credential header was present.
pub fn annotate_response(headers: &mut HeaderMap, names: &AuthHeaders, check: &HeaderCheck) {
    if check.header_present {
        headers.insert(
            names.verdict.clone(),
            HeaderValue::from_static(check.result.verdict_header_value()),
        );
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use tokengate_core::Token;

    fn names() -> AuthHeaders {
        AuthHeaders::from_config(&AuthConfig::default()).unwrap()
    }

    fn snapshot() -> TokenSnapshot {
        TokenSnapshot::new(1, vec![Token::new("abc123")])
    }

    #[test]
    fn missing_header_is_not_annotated() {
        let check = authorize_headers(&HeaderMap::new(), &names(), &snapshot());
        assert!(!check.header_present);
        assert_eq!(check.label(), "missing");

        let mut out = HeaderMap::new();
        annotate_response(&mut out, &names(), &check);
        assert!(out.is_empty());
    }

    #[test]
    fn known_token_is_annotated_with_one() {
        let mut req = HeaderMap::new();
        req.insert("authorization", HeaderValue::from_static("Bearer abc123"));
        let check = authorize_headers(&req, &names(), &snapshot());
        assert!(check.result.authorized);

        let mut out = HeaderMap::new();
        annotate_response(&mut out, &names(), &check);
        assert_eq!(out.get("token-valid").unwrap(), "1");
    }

    #[test]
    fn repeated_header_checks_first_value() {
        let mut req = HeaderMap::new();
        req.append("authorization", HeaderValue::from_static("Bearer abc123"));
        req.append("authorization", HeaderValue::from_static("Bearer wrong"));
        assert!(authorize_headers(&req, &names(), &snapshot()).result.authorized);

        let mut req = HeaderMap::new();
        req.append("authorization", HeaderValue::from_static("Bearer wrong"));
        req.append("authorization", HeaderValue::from_static("Bearer abc123"));
        assert!(!authorize_headers(&req, &names(), &snapshot()).result.authorized);
    }

    #[test]
    fn non_utf8_header_is_denied_and_annotated_with_zero() {
        let mut req = HeaderMap::new();
        req.insert("authorization", HeaderValue::from_bytes(&[0xff, 0xfe, b'a']).unwrap());
        let check = authorize_headers(&req, &names(), &snapshot());
        assert!(check.header_present);
        assert_eq!(check.result, AuthorizationResult::denied());

        let mut out = HeaderMap::new();
        annotate_response(&mut out, &names(), &check);
        assert_eq!(out.get("token-valid").unwrap(), "0");
    }
}
