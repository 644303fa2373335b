use super::user::User;
use serde::{Deserialize, Serialize};

/// Membership tier, as the members list module groups them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Member,
    Moderator,
    Admin,
}

impl MemberRole {
    /// Value of the module's `group` parameter.
    pub fn group(self) -> &'static str {
        match self {
            MemberRole::Member => "members",
            MemberRole::Moderator => "moderators",
            MemberRole::Admin => "admins",
        }
    }
}

/// A user listed as a member of a wiki.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiMember {
    pub user: User,
    pub role: MemberRole,
}

impl WikiMember {
    pub fn new(user: User, role: MemberRole) -> Self {
        Self { user, role }
    }
}
