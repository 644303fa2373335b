//! Session-authenticated HTTP client.
//!
//! Not a general HTTP client. It does exactly three things: log in through
//! the platform's login form, POST token-protected forms to a module
//! connector, and GET plain pages for scraping. No retries, no caching.

use crate::config::{ClientConfig, Credentials};
use crate::error::{WikidotError, WikidotResult};
use crate::params::Params;
use crate::session::{extract_session_cookie, Session, LOGIN_FAILURE_TEXT};
use crate::token::{RequestToken, TOKEN_FIELD};
use reqwest::header::{COOKIE, SET_COOKIE};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const CALLBACK_INDEX: &str = "callbackIndex";

/// A client bound to one (possibly anonymous) session.
///
/// Share it as `Arc<Client>`. Only [`Client::login`] writes the session;
/// every request reads it. Calls issued while a login is in flight may use
/// either cookie, so log in before handing the client out.
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
    session: RwLock<Session>,
}

impl Client {
    /// Build an anonymous client.
    pub fn new(config: ClientConfig) -> WikidotResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            config,
            session: RwLock::new(Session::anonymous()),
        })
    }

    /// Build a client and, when credentials are given, log in before
    /// returning it.
    pub async fn connect(
        config: ClientConfig,
        credentials: Option<Credentials>,
    ) -> WikidotResult<Self> {
        let client = Self::new(config)?;
        if let Some(creds) = credentials {
            client.login(&creds.username, &creds.password).await?;
        }
        Ok(client)
    }

    /// Settings this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Snapshot of the current session.
    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    /// Log in and replace the session.
    ///
    /// On any failure the previous session is left untouched.
    pub async fn login(&self, username: &str, password: &str) -> WikidotResult<Session> {
        let token = RequestToken::generate();
        let form = [
            ("login", username),
            ("password", password),
            ("action", "Login2Action"),
            ("event", "login"),
            (TOKEN_FIELD, token.as_str()),
            (CALLBACK_INDEX, "0"),
        ];

        debug!(url = %self.config.login_url, username, "logging in");
        let resp = self
            .http
            .post(&self.config.login_url)
            .header(COOKIE, token.cookie_pair())
            .form(&form)
            .send()
            .await?;

        let status_error = resp.error_for_status_ref().err();
        // Lossy so that an undecodable header does not shift the positions.
        let set_cookies: Vec<String> = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        let body = resp.text().await?;

        if body.contains(LOGIN_FAILURE_TEXT) {
            warn!(username, "login rejected: credentials do not match");
            return Err(WikidotError::Authentication(LOGIN_FAILURE_TEXT.to_string()));
        }
        if let Some(e) = status_error {
            return Err(e.into());
        }

        let cookie = extract_session_cookie(set_cookies.iter().map(String::as_str))?;
        let session = Session::authenticated(username, &cookie);
        *self.session.write().await = session.clone();

        info!(username, "logged in");
        Ok(session)
    }

    /// POST `params` to `url` with a fresh token and the session cookie, and
    /// return the JSON body as-is.
    pub async fn send(&self, url: &str, params: Params) -> WikidotResult<Value> {
        let token = RequestToken::generate();
        let cookie = self.session.read().await.cookie_header(&token);
        let form = dispatch_form(&token, params);

        debug!(
            url,
            module = form_value(&form, "moduleName"),
            action = form_value(&form, "action"),
            "dispatching request"
        );

        let resp = self
            .http
            .post(url)
            .header(COOKIE, cookie)
            .form(&form)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;

        if !(200..300).contains(&status) {
            warn!(url, status, "request failed");
            return Err(WikidotError::Request { status, body });
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(url, status, "response is not JSON: {e}");
                Err(WikidotError::Request { status, body })
            }
        }
    }

    /// GET a rendered page with the session cookie. Used for scraping data
    /// the module connector does not expose.
    pub async fn fetch_html(&self, url: &str) -> WikidotResult<String> {
        let cookie = self.session.read().await.auth_cookie().to_string();

        debug!(url, "fetching page");
        let mut req = self.http.get(url);
        if !cookie.is_empty() {
            req = req.header(COOKIE, cookie);
        }
        let resp = req.send().await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        if !(200..300).contains(&status) {
            return Err(WikidotError::Request { status, body });
        }
        Ok(body)
    }
}

/// Form body for one dispatch: the token and `callbackIndex=0` first, then
/// the caller's parameters. The two protocol fields cannot be overridden.
pub(crate) fn dispatch_form(token: &RequestToken, params: Params) -> Vec<(String, String)> {
    let mut form = vec![
        (TOKEN_FIELD.to_string(), token.as_str().to_string()),
        (CALLBACK_INDEX.to_string(), "0".to_string()),
    ];
    form.extend(
        params
            .into_iter()
            .filter(|(k, _)| k != TOKEN_FIELD && k != CALLBACK_INDEX),
    );
    form
}

fn form_value<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
    form.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_form_protocol_fields_first() {
        let token = RequestToken::generate();
        let form = dispatch_form(&token, Params::new().with("moduleName", "Empty"));
        assert_eq!(form[0], (TOKEN_FIELD.to_string(), token.to_string()));
        assert_eq!(form[1], ("callbackIndex".to_string(), "0".to_string()));
        assert_eq!(form[2], ("moduleName".to_string(), "Empty".to_string()));
    }

    #[test]
    fn test_dispatch_form_reserved_fields_not_overridable() {
        let token = RequestToken::generate();
        let params = Params::new()
            .with(TOKEN_FIELD, "forged")
            .with("callbackIndex", 7)
            .with("x", 1);
        let form = dispatch_form(&token, params);

        assert_eq!(form.len(), 3);
        assert_eq!(form_value(&form, TOKEN_FIELD), Some(token.as_str()));
        assert_eq!(form_value(&form, "callbackIndex"), Some("0"));
        assert_eq!(form_value(&form, "x"), Some("1"));
    }

    #[tokio::test]
    async fn test_new_client_is_anonymous() {
        let client = Client::new(ClientConfig::default()).unwrap();
        let session = client.session().await;
        assert!(!session.is_authenticated());
    }
}
