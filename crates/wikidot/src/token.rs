//! Per-request anti-forgery tokens.

use rand::distributions::{Distribution, Uniform};
use std::fmt;

/// Form field and cookie name the platform checks the token under.
pub const TOKEN_FIELD: &str = "wikidot_token7";

const TOKEN_LEN: usize = 10;
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A fresh random base-36 string, sent once in the Cookie header and once in
/// the form body of a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken(String);

impl RequestToken {
    /// Draw a new token from the thread-local RNG.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let pick = Uniform::from(0..ALPHABET.len());
        let token = (0..TOKEN_LEN)
            .map(|_| ALPHABET[pick.sample(&mut rng)] as char)
            .collect();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `wikidot_token7=<token>`, the cookie fragment appended after any
    /// session cookie.
    pub fn cookie_pair(&self) -> String {
        format!("{TOKEN_FIELD}={}", self.0)
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
