//! Shared helpers for tests against a mock wiki.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use wikidot::{Client, ClientConfig, Wiki};
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

pub const CONNECTOR: &str = "/ajax-module-connector.php";
pub const LOGIN: &str = "/login";
pub const SESSION_COOKIE: &str = "WIKIDOT_SESSION_ID=abc123";

/// Decoded form body of a captured request.
pub fn form(request: &Request) -> HashMap<String, String> {
    url::form_urlencoded::parse(&request.body)
        .into_owned()
        .collect()
}

/// `Cookie` header of a captured request.
pub fn cookie(request: &Request) -> String {
    request
        .headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Matches requests whose form body has `key=value`.
pub struct FormField {
    key: String,
    value: String,
}

impl Match for FormField {
    fn matches(&self, request: &Request) -> bool {
        form(request).get(&self.key) == Some(&self.value)
    }
}

pub fn form_field(key: &str, value: &str) -> FormField {
    FormField {
        key: key.to_string(),
        value: value.to_string(),
    }
}

pub fn ok_body(html: &str) -> Value {
    json!({ "status": "ok", "body": html })
}

/// Client whose login form lives on the mock server.
pub fn client_for(server: &MockServer) -> Client {
    let config = ClientConfig::default().with_login_url(format!("{}{LOGIN}", server.uri()));
    Client::new(config).expect("client builds")
}

pub fn wiki_for(server: &MockServer, client: Client) -> Wiki {
    Wiki::new(Arc::new(client), &server.uri()).expect("mock server uri is a valid base")
}

/// Login endpoint that accepts any credentials and sets the session cookie
/// as the second `Set-Cookie` entry.
pub async fn mount_login_success(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html>welcome</html>")
                .append_header("set-cookie", "wikidot_token7=ignored; path=/")
                .append_header(
                    "set-cookie",
                    format!("{SESSION_COOKIE}; expires=Fri, 01-Jan-2100 00:00:00 GMT; path=/")
                        .as_str(),
                ),
        )
        .mount(server)
        .await;
}

/// Connector answering every call with `body`.
pub async fn mount_connector(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path(CONNECTOR))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Connector answering calls to `module_name` with `body`.
pub async fn mount_module(server: &MockServer, module_name: &str, body: Value) {
    Mock::given(method("POST"))
        .and(path(CONNECTOR))
        .and(form_field("moduleName", module_name))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Connector answering `action_name` calls carrying `event` with `body`.
pub async fn mount_action(server: &MockServer, action_name: &str, event: &str, body: Value) {
    Mock::given(method("POST"))
        .and(path(CONNECTOR))
        .and(form_field("action", action_name))
        .and(form_field("event", event))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Requests received on `req_path`, in arrival order.
pub async fn requests_to(server: &MockServer, req_path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == req_path)
        .collect()
}
