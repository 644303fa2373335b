//! Authentication state captured at login.
//!
//! A session is either anonymous (empty cookie) or authenticated (the cookie
//! captured from the login response plus the `wikidot_udsession` flag). There
//! is no refresh and no logout: a session is replaced wholesale by the next
//! successful login.

use crate::error::{WikidotError, WikidotResult};
use crate::token::RequestToken;
use std::fmt;

/// Body text the login form returns on a credential mismatch.
pub const LOGIN_FAILURE_TEXT: &str = "The login and password do not match.";

/// Flag cookie the platform expects next to the session cookie.
pub const UDSESSION_FLAG: &str = "wikidot_udsession=1";

/// Position of the session cookie among the login response's `Set-Cookie`
/// headers. Observed server behaviour; the cookie name is not checked.
pub const SESSION_COOKIE_INDEX: usize = 1;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    username: Option<String>,
    auth_cookie: String,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub(crate) fn authenticated(username: &str, session_cookie: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            auth_cookie: format!("{session_cookie}; {UDSESSION_FLAG}; "),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.auth_cookie.is_empty()
    }

    /// The user that logged in, if any.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Cookie prefix replayed on every request; empty when anonymous.
    pub fn auth_cookie(&self) -> &str {
        &self.auth_cookie
    }

    /// Full `Cookie` header value for one request.
    pub fn cookie_header(&self, token: &RequestToken) -> String {
        format!("{}{}", self.auth_cookie, token.cookie_pair())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

/// Pick the session cookie out of a login response's `Set-Cookie` values.
///
/// Precondition: the session cookie is the entry at [`SESSION_COOKIE_INDEX`].
/// Only the `name=value` part before the first `"; "` is kept.
pub fn extract_session_cookie<'a, I>(set_cookies: I) -> WikidotResult<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let raw = set_cookies
        .into_iter()
        .nth(SESSION_COOKIE_INDEX)
        .ok_or_else(|| {
            WikidotError::Authentication(format!(
                "login response carried fewer than {} Set-Cookie headers",
                SESSION_COOKIE_INDEX + 1
            ))
        })?;

    let pair = raw.split("; ").next().unwrap_or_default().trim();
    if pair.is_empty() {
        return Err(WikidotError::Authentication(
            "session cookie in login response is empty".to_string(),
        ));
    }
    Ok(pair.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_session() {
        let session = Session::anonymous();
        assert!(!session.is_authenticated());
        assert_eq!(session.auth_cookie(), "");
        assert!(session.username().is_none());
    }

    #[test]
    fn test_anonymous_cookie_header_carries_only_token() {
        let token = RequestToken::generate();
        let header = Session::anonymous().cookie_header(&token);
        assert_eq!(header, format!("wikidot_token7={token}"));
    }

    #[test]
    fn test_authenticated_cookie_header() {
        let token = RequestToken::generate();
        let session = Session::authenticated("alice", "WIKIDOT_SESSION_ID=abc123");
        assert!(session.is_authenticated());
        assert_eq!(session.username(), Some("alice"));
        assert_eq!(
            session.cookie_header(&token),
            format!("WIKIDOT_SESSION_ID=abc123; wikidot_udsession=1; wikidot_token7={token}")
        );
    }

    #[test]
    fn test_extract_second_cookie() {
        let headers = [
            "wikidot_token7=xyz; path=/",
            "WIKIDOT_SESSION_ID=abc123; expires=Thu, 01 Jan 2099 00:00:00 GMT; path=/",
            "other=1",
        ];
        let cookie = extract_session_cookie(headers).unwrap();
        assert_eq!(cookie, "WIKIDOT_SESSION_ID=abc123");
    }

    #[test]
    fn test_extract_missing_cookie_is_auth_error() {
        let err = extract_session_cookie(["only=one; path=/"]).unwrap_err();
        assert!(matches!(err, WikidotError::Authentication(_)));

        let err = extract_session_cookie(std::iter::empty()).unwrap_err();
        assert!(matches!(err, WikidotError::Authentication(_)));
    }

    #[test]
    fn test_debug_hides_cookie() {
        let session = Session::authenticated("alice", "WIKIDOT_SESSION_ID=secret");
        let shown = format!("{session:?}");
        assert!(!shown.contains("secret"));
        assert!(shown.contains("alice"));
    }
}
