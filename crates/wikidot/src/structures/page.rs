//! Wiki pages.

use crate::error::{WikidotError, WikidotResult};
use crate::html;
use crate::name::CanonicalName;
use crate::params::Params;
use crate::wiki::{body_of, ensure_ok, field_string, Wiki};
use serde_json::Value;
use tracing::debug;

/// A page whose id has been resolved. Built by [`Page::load`]; every getter
/// is a fresh round trip.
#[derive(Debug, Clone)]
pub struct Page {
    wiki: Wiki,
    name: CanonicalName,
    page_id: u64,
}

impl Page {
    /// Resolve `unix_name` on `wiki`.
    ///
    /// The name must already be canonical and slash-free; it is rejected
    /// locally otherwise. The page id is read from the rendered page.
    pub async fn load(wiki: &Wiki, unix_name: &str) -> WikidotResult<Self> {
        let name = CanonicalName::parse(unix_name, false)?;
        let url = wiki.page_url(&name);
        let page_html = wiki.client().fetch_html(&url).await?;

        let page_id = html::extract_page_id(&page_html)
            .ok_or_else(|| WikidotError::Response(format!("no page id found at {url}")))?;
        debug!(page = %name, page_id, "page loaded");

        Ok(Self {
            wiki: wiki.clone(),
            name,
            page_id,
        })
    }

    pub fn wiki(&self) -> &Wiki {
        &self.wiki
    }

    pub fn unix_name(&self) -> &CanonicalName {
        &self.name
    }

    pub fn page_id(&self) -> u64 {
        self.page_id
    }

    /// Wikitext of the latest revision, or of `revision_id` when given.
    pub async fn source(&self, revision_id: Option<&str>) -> WikidotResult<String> {
        let resp = match revision_id {
            Some(rev) => {
                self.wiki
                    .module(
                        "history/PageSourceModule",
                        Params::new().with("revision_id", rev),
                    )
                    .await?
            }
            None => {
                self.wiki
                    .module(
                        "viewsource/ViewSourceModule",
                        Params::new().with("page_id", self.page_id),
                    )
                    .await?
            }
        };

        html::extract_page_source(body_of(&resp)?)
            .ok_or_else(|| WikidotError::Response("no page source in response".to_string()))
    }

    /// Current tags, in the order the tag editor lists them.
    pub async fn tags(&self) -> WikidotResult<Vec<String>> {
        let resp = self
            .wiki
            .module(
                "pagetags/PageTagsModule",
                Params::new().with("pageId", self.page_id),
            )
            .await?;

        html::extract_tags(body_of(&resp)?)
            .ok_or_else(|| WikidotError::Response("no tag input in response".to_string()))
    }

    /// Revision ids, newest first, for one page of the history list.
    pub async fn history(&self, query: HistoryQuery) -> WikidotResult<Vec<String>> {
        let params = Params::new()
            .with("page_id", self.page_id)
            .with("page", query.page)
            .with("perpage", query.per_page)
            .with("options", &query.options);
        let resp = self
            .wiki
            .module("history/PageRevisionListModule", params)
            .await?;

        Ok(html::extract_revision_ids(body_of(&resp)?))
    }

    /// Take the edit lock, then save. Fields left `None` in `edit` are not
    /// sent.
    pub async fn edit(&self, edit: PageEdit) -> WikidotResult<Value> {
        let lock = self
            .wiki
            .module(
                "edit/PageEditModule",
                Params::new()
                    .with("mode", "page")
                    .with("wiki_page", &self.name)
                    .with("force_lock", "true"),
            )
            .await?;
        ensure_ok(&lock)?;

        let lock_id = field_string(&lock, "lock_id")
            .ok_or_else(|| WikidotError::Response("edit lock has no lock_id".to_string()))?;
        let lock_secret = field_string(&lock, "lock_secret")
            .ok_or_else(|| WikidotError::Response("edit lock has no lock_secret".to_string()))?;

        let mut params = Params::new()
            .with("event", "savePage")
            .with("wiki_page", &self.name)
            .with("lock_id", lock_id)
            .with("lock_secret", lock_secret);
        if let Some(rev) = field_string(&lock, "page_revision_id") {
            params.insert("revision_id", rev);
        }
        let params = params.merge(edit.into_params());

        let resp = self.wiki.action("WikiPageAction", params).await?;
        ensure_ok(&resp)?;
        Ok(resp)
    }

    /// Replace or adjust the tag set. Returns the tags that were saved.
    pub async fn edit_tags(&self, edit: TagEdit) -> WikidotResult<Vec<String>> {
        let current = match &edit {
            TagEdit::Replace(_) => Vec::new(),
            TagEdit::Modify { .. } => self.tags().await?,
        };
        let tags = edit.apply(&current);

        let params = Params::new()
            .with("event", "saveTags")
            .with("pageId", self.page_id)
            .with("tags", tags.join(" "));
        let resp = self.wiki.action("WikiPageAction", params).await?;
        ensure_ok(&resp)?;
        Ok(tags)
    }

    /// Delete the page. Consumes the handle.
    pub async fn delete(self) -> WikidotResult<()> {
        let params = Params::new()
            .with("event", "deletePage")
            .with("page_id", self.page_id);
        let resp = self.wiki.action("WikiPageAction", params).await?;
        ensure_ok(&resp)
    }

    /// Rename to `new_name`, which must be canonical. Returns the page under
    /// its new name.
    pub async fn rename(&self, new_name: &str) -> WikidotResult<Page> {
        let new_name = CanonicalName::parse(new_name, false)?;
        let params = Params::new()
            .with("event", "renamePage")
            .with("page_id", self.page_id)
            .with("new_name", &new_name);
        let resp = self.wiki.action("WikiPageAction", params).await?;
        ensure_ok(&resp)?;

        Ok(Page {
            wiki: self.wiki.clone(),
            name: new_name,
            page_id: self.page_id,
        })
    }
}

/// Paging for [`Page::history`].
#[derive(Debug, Clone)]
pub struct HistoryQuery {
    pub page: u32,
    pub per_page: u32,
    /// Revision type filter, as the module's JSON `options` string.
    pub options: String,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            options: r#"{"all":true}"#.to_string(),
        }
    }
}

/// Changes for [`Page::edit`].
#[derive(Debug, Clone, Default)]
pub struct PageEdit {
    pub title: Option<String>,
    pub source: Option<String>,
    pub comments: Option<String>,
}

impl PageEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    fn into_params(self) -> Params {
        [
            ("title", self.title),
            ("source", self.source),
            ("comments", self.comments),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect()
    }
}

/// A change to a page's tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEdit {
    /// Use exactly these tags.
    Replace(Vec<String>),
    /// Add and remove relative to the current tags.
    Modify { add: Vec<String>, remove: Vec<String> },
}

impl TagEdit {
    /// Whitespace-separated tag list, as the tag editor takes it.
    pub fn parse(tags: &str) -> Self {
        TagEdit::Replace(split_tags(tags))
    }

    pub fn modify(add: &str, remove: &str) -> Self {
        TagEdit::Modify {
            add: split_tags(add),
            remove: split_tags(remove),
        }
    }

    /// Resulting tag list given the `current` tags. Order is preserved and
    /// duplicates dropped.
    pub fn apply(self, current: &[String]) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        match self {
            TagEdit::Replace(new) => {
                for tag in new {
                    push_unique(&mut tags, tag);
                }
            }
            TagEdit::Modify { add, remove } => {
                for tag in current.iter().cloned().chain(add) {
                    push_unique(&mut tags, tag);
                }
                tags.retain(|t| !remove.contains(t));
            }
        }
        tags
    }
}

fn push_unique(tags: &mut Vec<String>, tag: String) {
    if !tags.contains(&tag) {
        tags.push(tag);
    }
}

fn split_tags(tags: &str) -> Vec<String> {
    tags.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tag_replace() {
        let tags = TagEdit::parse("scp  euclid scp").apply(&strings(&["old"]));
        assert_eq!(tags, strings(&["scp", "euclid"]));
    }

    #[test]
    fn test_tag_modify() {
        let current = strings(&["scp", "euclid", "sculpture"]);
        let tags = TagEdit::modify("keter scp", "euclid").apply(&current);
        assert_eq!(tags, strings(&["scp", "sculpture", "keter"]));
    }

    #[test]
    fn test_tag_modify_remove_wins_over_add() {
        let tags = TagEdit::modify("x", "x").apply(&[]);
        assert!(tags.is_empty());
    }

    #[test]
    fn test_page_edit_params_skip_unset_fields() {
        let params = PageEdit::new().source("body").comments("typo").into_params();
        assert_eq!(params.get("source"), Some("body"));
        assert_eq!(params.get("comments"), Some("typo"));
        assert!(!params.contains_key("title"));
    }

    #[test]
    fn test_history_query_default() {
        let q = HistoryQuery::default();
        assert_eq!(q.page, 1);
        assert_eq!(q.per_page, 20);
        assert_eq!(q.options, r#"{"all":true}"#);
    }
}
