//! Per-request authorization decision.
//!
//! Pure function over (header value, snapshot): no internal state, no I/O.
//! Missing or malformed credentials are indistinguishable from a wrong token.

use serde::Serialize;

use crate::token::TokenSnapshot;

/// Accepted scheme prefix, matched case-insensitively.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Outcome of one authorization check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationResult {
    pub authorized: bool,
    /// The matching token, or empty when unauthorized.
    pub matched_token: String,
}

impl AuthorizationResult {
    /// The single unauthorized value.
    pub fn denied() -> Self {
        Self {
            authorized: false,
            matched_token: String::new(),
        }
    }

    fn granted(token: &str) -> Self {
        Self {
            authorized: true,
            matched_token: token.to_string(),
        }
    }

    /// Value for the verdict response header.
    pub fn verdict_header_value(&self) -> &'static str {
        if self.authorized {
            "1"
        } else {
            "0"
        }
    }
}

/// Strip a case-insensitive `Bearer ` scheme; bare tokens pass through as-is.
pub fn strip_bearer(header: &str) -> &str {
    match header.get(..BEARER_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(BEARER_PREFIX) => {
            header.get(BEARER_PREFIX.len()..).unwrap_or(header)
        }
        _ => header,
    }
}

/// Decide whether `header` carries a token present in `snapshot`.
///
/// First match in snapshot order wins.
pub fn authorize(header: Option<&str>, snapshot: &TokenSnapshot) -> AuthorizationResult {
    let Some(header) = header else {
        return AuthorizationResult::denied();
    };
    if snapshot.is_empty() {
        return AuthorizationResult::denied();
    }

    let presented = strip_bearer(header);
    if presented.is_empty() {
        return AuthorizationResult::denied();
    }

    match snapshot.find(presented) {
        Some(t) => AuthorizationResult::granted(&t.token),
        None => AuthorizationResult::denied(),
    }
}
