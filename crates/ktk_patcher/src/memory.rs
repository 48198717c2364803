//! Cross-operation token memory.
//!
//! A string-table append can remember the index it was given under a numbered
//! `StrRefN` token. Any later operation may then refer to that token wherever a
//! string reference is expected, and script sources may embed it as
//! `#StrRefN#`. Tokens live for one run.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// A string reference that is either a literal index or a `StrRefN` token.
///
/// Deserializes from a bare integer (`42`) or a string (`"StrRef3"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StrRefValue {
    Literal(u32),
    Token(String),
}

impl fmt::Display for StrRefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrRefValue::Literal(value) => write!(f, "{}", value),
            StrRefValue::Token(token) => f.write_str(token),
        }
    }
}

/// Parse the slot number out of a `StrRefN` token (case-insensitive prefix).
pub fn parse_strref_token(token: &str) -> Result<u32> {
    let trimmed = token.trim();
    let prefix = trimmed.get(..6).unwrap_or_default();
    if !prefix.eq_ignore_ascii_case("strref") {
        return Err(Error::InvalidToken(token.to_string()));
    }
    trimmed[6..]
        .parse()
        .map_err(|_| Error::InvalidToken(token.to_string()))
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)#strref(\d+)#").expect("static regex"))
}

/// Token values accumulated during a run.
#[derive(Debug, Clone, Default)]
pub struct PatcherMemory {
    strrefs: BTreeMap<u32, u32>,
}

impl PatcherMemory {
    pub fn store_strref(&mut self, slot: u32, strref: u32) {
        tracing::debug!("StrRef{} = {}", slot, strref);
        self.strrefs.insert(slot, strref);
    }

    pub fn strref(&self, slot: u32) -> Option<u32> {
        self.strrefs.get(&slot).copied()
    }

    /// Resolve a literal or token to a concrete string reference.
    pub fn resolve(&self, value: &StrRefValue) -> Result<u32> {
        match value {
            StrRefValue::Literal(strref) => Ok(*strref),
            StrRefValue::Token(token) => {
                let slot = parse_strref_token(token)?;
                self.strref(slot)
                    .ok_or_else(|| Error::UnknownToken(token.clone()))
            }
        }
    }

    /// Replace every `#StrRefN#` in `text` with its stored value.
    pub fn substitute(&self, text: &str) -> Result<String> {
        let pattern = token_pattern();
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for captures in pattern.captures_iter(text) {
            let whole = captures.get(0).expect("group 0 always matches");
            let slot: u32 = captures[1]
                .parse()
                .map_err(|_| Error::InvalidToken(whole.as_str().to_string()))?;
            let value = self
                .strref(slot)
                .ok_or_else(|| Error::UnknownToken(whole.as_str().trim_matches('#').to_string()))?;

            out.push_str(&text[last..whole.start()]);
            out.push_str(&value.to_string());
            last = whole.end();
        }

        out.push_str(&text[last..]);
        Ok(out)
    }
}
