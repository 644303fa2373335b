//! Canonical ("unix") names for pages and wikis.
//!
//! Every identifier sent to the server goes through the same pipeline:
//!
//! 1. lowercase
//! 2. squash runs of `:`
//! 3. turn runs of anything outside `[a-z0-9_:/-]`, and runs of `-`, into one `-`
//! 4. strip dashes at the start of the string or of any `/` segment
//! 5. strip dashes at the end of the string or of any `/` segment
//! 6. squash runs of `/`
//! 7. strip trailing `/`, unless the whole name is `/`
//!
//! [`is_normal`] is the predicate form: a name is normal when the pipeline
//! leaves it unchanged.

use crate::error::{WikidotError, WikidotResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::sync::OnceLock;

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn new(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("normalization regex is valid"),
            replacement,
        }
    }
}

/// Steps 2-6, in application order.
fn rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            Rule::new(r":{2,}", ":"),
            // `-` is outside the class, so a lone dash maps to itself and a
            // dash run merges with any neighbouring disallowed characters.
            Rule::new(r"[^a-z0-9_:/]+", "-"),
            Rule::new(r"(^|/)-+", "${1}"),
            Rule::new(r"-+($|/)", "${1}"),
            Rule::new(r"/{2,}", "/"),
        ]
    })
}

/// Normalize an arbitrary string into a canonical name.
///
/// Total: any input maps to some valid name (possibly empty).
pub fn normalize(src: &str) -> String {
    let mut name = src.to_lowercase();

    for rule in rules() {
        if rule.pattern.is_match(&name) {
            name = rule
                .pattern
                .replace_all(&name, rule.replacement)
                .into_owned();
        }
    }

    if name.len() > 1 {
        let trimmed = name.trim_end_matches('/').len();
        name.truncate(trimmed);
    }

    name
}

/// Whether `name` is already canonical.
///
/// With `allow_slash = false` any `/` makes the name invalid, including the
/// root name `/`.
pub fn is_normal(name: &str, allow_slash: bool) -> bool {
    if !allow_slash && name.contains('/') {
        return false;
    }
    normalize(name) == name
}

/// A name known to satisfy the canonical grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalName(String);

impl CanonicalName {
    /// Accept `name` only if it is already canonical.
    pub fn parse(name: &str, allow_slash: bool) -> WikidotResult<Self> {
        if !allow_slash && name.contains('/') {
            return Err(WikidotError::validation(name, "slashes are not allowed"));
        }
        if !is_normal(name, allow_slash) {
            return Err(WikidotError::validation(
                name,
                format!("not a canonical name (expected {:?})", normalize(name)),
            ));
        }
        if name.is_empty() {
            return Err(WikidotError::validation(name, "name is empty"));
        }
        Ok(Self(name.to_string()))
    }

    /// Normalize `name`. Fails only when nothing survives normalization.
    pub fn normalized(name: &str) -> WikidotResult<Self> {
        let normal = normalize(name);
        if normal.is_empty() {
            return Err(WikidotError::validation(name, "normalizes to an empty name"));
        }
        Ok(Self(normal))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for CanonicalName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}
