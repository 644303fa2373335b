//! A single wiki and its module/action façade.

use crate::client::Client;
use crate::error::{WikidotError, WikidotResult};
use crate::html;
use crate::name::CanonicalName;
use crate::params::Params;
use crate::structures::{MemberRole, MembershipApplication, Page, User, WikiMember};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Module connector path under a wiki's base URL.
pub const CONNECTOR_PATH: &str = "ajax-module-connector.php";

/// Sentinel module name for action calls.
pub const EMPTY_MODULE: &str = "Empty";

/// A wiki reached through a shared [`Client`].
///
/// Cheap to clone; clones share the client and its session.
#[derive(Clone)]
pub struct Wiki {
    base_url: Url,
    connector: Url,
    client: Arc<Client>,
}

impl Wiki {
    /// A wiki at `base_url`, e.g. `https://scp-wiki.wikidot.com`.
    pub fn new(client: Arc<Client>, base_url: &str) -> WikidotResult<Self> {
        let mut url =
            Url::parse(base_url).map_err(|e| WikidotError::validation(base_url, e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(WikidotError::validation(base_url, "not a base URL"));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);
        url.set_fragment(None);

        let connector = url
            .join(CONNECTOR_PATH)
            .map_err(|e| WikidotError::validation(base_url, e.to_string()))?;

        Ok(Self {
            base_url: url,
            connector,
            client,
        })
    }

    /// The hosted wiki `https://<slug>.wikidot.com/`.
    pub fn from_slug(client: Arc<Client>, slug: &str) -> WikidotResult<Self> {
        let slug = CanonicalName::parse(slug, false)?;
        if !slug.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(WikidotError::validation(
                slug.as_str(),
                "wiki slugs may only contain letters, digits and dashes",
            ));
        }
        Self::new(client, &format!("https://{slug}.wikidot.com/"))
    }

    /// Root URL of the wiki, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Client shared by every handle to this wiki.
    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    /// Rendered page URL for a canonical page name.
    pub fn page_url(&self, name: &CanonicalName) -> String {
        format!("{}{}", self.base_url, name)
    }

    /// Call a module (`list/ListPagesModule`, ...). `moduleName` is pinned to
    /// `name` even if `params` carries one; a caller cannot redirect the
    /// call to another module.
    pub async fn module(&self, name: &str, params: Params) -> WikidotResult<Value> {
        let params = params.with("moduleName", name);
        self.client.send(self.connector.as_str(), params).await
    }

    /// Call an action through the `Empty` module. `action` and `moduleName`
    /// are pinned, overriding caller keys of the same name.
    pub async fn action(&self, name: &str, params: Params) -> WikidotResult<Value> {
        let params = params
            .with("action", name)
            .with("moduleName", EMPTY_MODULE);
        self.client.send(self.connector.as_str(), params).await
    }

    /// Load a page by unix name.
    pub async fn page(&self, unix_name: &str) -> WikidotResult<Page> {
        Page::load(self, unix_name).await
    }

    /// Run `list/ListPagesModule` and return its raw JSON.
    pub async fn list_pages(&self, params: Params) -> WikidotResult<Value> {
        let defaults = Params::new()
            .with("category", ".")
            .with("order", "created_at desc")
            .with("perPage", 20)
            .with("separate", "true")
            .with("module_body", "");
        let resp = self
            .module("list/ListPagesModule", defaults.merge(params))
            .await?;
        ensure_ok(&resp)?;
        Ok(resp)
    }

    /// Members holding `role` (plain members when `None`). `filter` carries
    /// optional list settings such as `order`.
    pub async fn members(
        &self,
        role: Option<MemberRole>,
        filter: Params,
    ) -> WikidotResult<Vec<WikiMember>> {
        let role = role.unwrap_or(MemberRole::Member);
        let params = Params::new().with("group", role.group()).merge(filter);
        let resp = self.module("membership/MembersListModule", params).await?;

        let members = html::extract_members(body_of(&resp)?)
            .into_iter()
            .map(|(id, name)| WikiMember::new(User::new(&name, Some(&id)), role))
            .collect();
        Ok(members)
    }

    /// Pending membership applications, one per applicant.
    pub async fn applications(&self) -> WikidotResult<Vec<MembershipApplication>> {
        let resp = self
            .module(
                "managesite/ManageSiteMembersApplicationsModule",
                Params::new(),
            )
            .await?;

        let apps = html::extract_applications(body_of(&resp)?)
            .into_iter()
            .map(|(id, name)| {
                MembershipApplication::new(self.clone(), User::new(&name, Some(&id)), "")
            })
            .collect();
        Ok(apps)
    }
}

impl std::fmt::Debug for Wiki {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wiki")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Fail unless the connector reported `status: "ok"`.
pub(crate) fn ensure_ok(resp: &Value) -> WikidotResult<()> {
    match resp.get("status").and_then(Value::as_str) {
        Some("ok") => Ok(()),
        Some(status) => {
            let message = resp
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("no message");
            Err(WikidotError::Response(format!("{status}: {message}")))
        }
        None => Err(WikidotError::Response("missing status field".to_string())),
    }
}

/// The HTML `body` of a successful module response.
pub(crate) fn body_of(resp: &Value) -> WikidotResult<&str> {
    ensure_ok(resp)?;
    resp.get("body")
        .and_then(Value::as_str)
        .ok_or_else(|| WikidotError::Response("missing body field".to_string()))
}

/// A string or numeric field as a string.
pub(crate) fn field_string(resp: &Value, key: &str) -> Option<String> {
    match resp.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
