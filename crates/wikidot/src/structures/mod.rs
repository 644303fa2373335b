//! Entities reconstructed from module responses.

pub mod application;
pub mod member;
pub mod page;
pub mod user;

pub use application::{Decision, MembershipApplication};
pub use member::{MemberRole, WikiMember};
pub use page::{HistoryQuery, Page, PageEdit, TagEdit};
pub use user::User;
