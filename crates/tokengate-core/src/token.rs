//! Token records and the immutable snapshot served to request handlers.
//!
//! Backing file format: a JSON array of records, each with a `token` string and
//! an optional nullable `maxReqs` integer. Unknown fields are ignored so the
//! provisioning tooling can attach its own metadata.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TokenGateError};

/// Canonical empty token list (written on create and on self-heal).
pub const EMPTY_TOKEN_LIST: &str = "[]";

/// One API token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Opaque credential string.
    pub token: String,
    /// Reserved for quota enforcement; carried through untouched, negative
    /// values included.
    #[serde(rename = "maxReqs", default)]
    pub max_requests: Option<i64>,
}

impl Token {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            max_requests: None,
        }
    }

    pub fn with_max_requests(mut self, max: i64) -> Self {
        self.max_requests = Some(max);
        self
    }
}

/// Point-in-time view of the full valid-token list.
///
/// Built completely before it is published and never mutated afterwards.
/// Readers holding an old snapshot keep a consistent view until they drop it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSnapshot {
    revision: u64,
    tokens: Vec<Token>,
}

impl TokenSnapshot {
    /// Bootstrap snapshot (revision 0, no tokens).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(revision: u64, tokens: Vec<Token>) -> Self {
        Self { revision, tokens }
    }

    /// Publish counter assigned by the store.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Tokens in backing-file order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// First token (in file order) equal to `presented`.
    pub fn find(&self, presented: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.token == presented)
    }
}

/// Parse backing-file content into an ordered token list.
///
/// Empty or whitespace-only content is the empty list. Records with an empty
/// `token` are dropped so a blank credential can never authorize.
pub fn parse_token_list(s: &str) -> Result<Vec<Token>> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }

    let raw: Vec<Token> = serde_json::from_str(s)
        .map_err(|e| TokenGateError::BackingFileParse(format!("invalid token list: {e}")))?;

    let mut out = Vec::with_capacity(raw.len());
    for (index, t) in raw.into_iter().enumerate() {
        if t.token.is_empty() {
            tracing::warn!(index, "skipping token record with empty token");
            continue;
        }
        out.push(t);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn max_reqs_defaults_to_none() {
        let list = parse_token_list(r#"[{"token":"a"},{"token":"b","maxReqs":10}]"#).unwrap();
        assert_eq!(list[0].max_requests, None);
        assert_eq!(list[1].max_requests, Some(10));
    }

    #[test]
    fn blank_content_is_empty_list() {
        assert!(parse_token_list("").unwrap().is_empty());
        assert!(parse_token_list(" \n\t").unwrap().is_empty());
    }

    #[test]
    fn empty_token_records_are_dropped() {
        let list = parse_token_list(r#"[{"token":""},{"token":"x"}]"#).unwrap();
        assert_eq!(list, vec![Token::new("x")]);
    }

    #[test]
    fn object_instead_of_array_is_parse_error() {
        let err = parse_token_list(r#"{"token":"x"}"#).unwrap_err();
        assert!(matches!(err, TokenGateError::BackingFileParse(_)));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let list = parse_token_list(r#"[{"token":"k","maxReqs":3,"owner":"ops"}]"#).unwrap();
        assert_eq!(list, vec![Token::new("k").with_max_requests(3)]);
    }
}
