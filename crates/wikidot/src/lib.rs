//! Wikidot client — session login, token-protected module/action calls, and
//! page/user/membership scraping on top of them.
//!
//! ```no_run
//! use std::sync::Arc;
//! use wikidot::{Client, ClientConfig, Credentials, Params, Wiki};
//!
//! # async fn run() -> wikidot::WikidotResult<()> {
//! let client = Client::connect(
//!     ClientConfig::default(),
//!     Some(Credentials::new("user", "password")),
//! )
//! .await?;
//! let wiki = Wiki::from_slug(Arc::new(client), "scp-wiki")?;
//!
//! let page = wiki.page("scp-173").await?;
//! let tags = page.tags().await?;
//! let listing = wiki.list_pages(Params::new().with("category", "_default")).await?;
//! # let _ = (tags, listing);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod html;
pub mod name;
pub mod params;
pub mod session;
pub mod structures;
pub mod token;
pub mod wiki;

pub use client::Client;
pub use config::{ClientConfig, Credentials};
pub use error::{WikidotError, WikidotResult};
pub use name::{is_normal, normalize, CanonicalName};
pub use params::Params;
pub use session::Session;
pub use structures::{
    Decision, HistoryQuery, MemberRole, MembershipApplication, Page, PageEdit, TagEdit, User,
    WikiMember,
};
pub use token::RequestToken;
pub use wiki::Wiki;
