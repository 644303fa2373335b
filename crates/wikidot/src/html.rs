//! Field extraction from server-rendered HTML.
//!
//! Each function takes one fragment (a module's `body`, or a full page) and
//! pulls out a single kind of value with CSS selectors. Markup that does not
//! match is skipped, not reported; callers decide whether an empty result is
//! an error.

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;

fn page_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"WIKIREQUEST\.info\.pageId\s*=\s*(\d+)\s*;").expect("page id regex is valid")
    })
}

/// Page id from the `WIKIREQUEST.info.pageId = N;` assignment in a head
/// script of a rendered page.
pub fn extract_page_id(html: &str) -> Option<u64> {
    let document = Html::parse_document(html);
    let script_sel = Selector::parse("head script").expect("script selector is valid");

    document.select(&script_sel).find_map(|script| {
        let text: String = script.text().collect();
        page_id_re()
            .captures(&text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    })
}

/// Tags from the tag editor's `#page-tags-input` value.
pub fn extract_tags(fragment: &str) -> Option<Vec<String>> {
    let document = Html::parse_fragment(fragment);
    let sel = Selector::parse(r#"input[id="page-tags-input"]"#).expect("tags selector is valid");

    let value = document.select(&sel).next()?.value().attr("value")?;
    Some(value.split_whitespace().map(|t| t.to_string()).collect())
}

/// `(user_id, name)` pairs from a members list: one `img.small` avatar per
/// member, the id in the `userid` query parameter of `src`, the name in `alt`.
pub fn extract_members(fragment: &str) -> Vec<(String, String)> {
    let document = Html::parse_fragment(fragment);
    let sel = Selector::parse("img.small").expect("avatar selector is valid");

    document
        .select(&sel)
        .filter_map(|img| {
            let src = img.value().attr("src")?;
            let name = img.value().attr("alt")?.trim();
            let query = src.split_once('?')?.1;
            let user_id = url::form_urlencoded::parse(query.as_bytes())
                .find(|(k, _)| k == "userid")
                .map(|(_, v)| v.into_owned())?;
            Some((user_id, name.to_string()))
        })
        .collect()
}

/// `(user_id, name)` pairs from the pending applications list.
///
/// Each applicant has accept/decline buttons whose `onclick` reads
/// `...(event, <user_id>, "<name>")`; duplicates are dropped.
pub fn extract_applications(fragment: &str) -> Vec<(String, String)> {
    let document = Html::parse_fragment(fragment);
    let sel = Selector::parse(r#"a.btn-primary[href="javascript:;"]"#)
        .expect("application selector is valid");

    let mut seen = HashSet::new();
    document
        .select(&sel)
        .filter_map(|a| parse_onclick_args(a.value().attr("onclick")?))
        .filter(|(id, _)| seen.insert(id.clone()))
        .collect()
}

fn parse_onclick_args(onclick: &str) -> Option<(String, String)> {
    let start = onclick.find('(')? + 1;
    let end = onclick.rfind(')')?;
    let args: Vec<&str> = onclick.get(start..end)?.split(',').map(str::trim).collect();

    let user_id = args.get(1)?;
    if user_id.is_empty() || !user_id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let name = args.get(2)?.trim_matches(|c| c == '"' || c == '\'');
    Some((user_id.to_string(), name.to_string()))
}

/// Revision ids from a revision list (`<tr id="revision-row-N">`).
pub fn extract_revision_ids(fragment: &str) -> Vec<String> {
    let document = Html::parse_fragment(fragment);
    let sel = Selector::parse(r#"tr[id^="revision-row-"]"#).expect("revision selector is valid");

    document
        .select(&sel)
        .filter_map(|row| row.value().id())
        .filter_map(|id| id.strip_prefix("revision-row-"))
        .map(|id| id.to_string())
        .collect()
}

/// Wikitext inside `div.page-source`.
///
/// The server renders line breaks as `<br />` followed by the original
/// newline; a `<br>` adds a newline only when the text after it lacks one.
/// Indentation (`&nbsp;`) is kept, only surrounding layout whitespace is
/// trimmed.
pub fn extract_page_source(fragment: &str) -> Option<String> {
    let document = Html::parse_fragment(fragment);
    let sel = Selector::parse("div.page-source").expect("source selector is valid");

    let div = document.select(&sel).next()?;
    let text = element_text(div);
    Some(
        text.trim_matches(|c: char| matches!(c, '\n' | '\r' | '\t'))
            .to_string(),
    )
}

fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => {
                let newline_follows = node
                    .next_sibling()
                    .and_then(|next| next.value().as_text().map(|t| t.starts_with('\n')))
                    .unwrap_or(false);
                if !newline_follows {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
    out.replace('\u{a0}', " ")
}
