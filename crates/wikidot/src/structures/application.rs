use super::user::User;
use crate::error::{WikidotError, WikidotResult};
use crate::params::Params;
use crate::wiki::{ensure_ok, Wiki};
use serde_json::Value;

/// Outcome of reviewing an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Decline,
}

impl Decision {
    fn as_str(self) -> &'static str {
        match self {
            Decision::Accept => "accept",
            Decision::Decline => "decline",
        }
    }
}

/// A pending request to join a wiki.
#[derive(Debug, Clone)]
pub struct MembershipApplication {
    pub user: User,
    pub text: String,
    wiki: Wiki,
}

impl MembershipApplication {
    pub fn new(wiki: Wiki, user: User, text: impl Into<String>) -> Self {
        Self {
            user,
            text: text.into(),
            wiki,
        }
    }

    pub fn wiki(&self) -> &Wiki {
        &self.wiki
    }

    /// Accept the application. The platform records `reason` but does not
    /// forward it to the applicant.
    pub async fn accept(&self, reason: Option<&str>) -> WikidotResult<Value> {
        self.decide(Decision::Accept, reason).await
    }

    pub async fn decline(&self, reason: Option<&str>) -> WikidotResult<Value> {
        self.decide(Decision::Decline, reason).await
    }

    pub async fn decide(&self, decision: Decision, reason: Option<&str>) -> WikidotResult<Value> {
        let user_id = self.user.id.as_deref().ok_or_else(|| {
            WikidotError::validation(self.user.unix_name.as_str(), "applicant has no user id")
        })?;

        let params = Params::new()
            .with("event", "acceptApplication")
            .with("user_id", user_id)
            .with("text", reason.unwrap_or_default())
            .with("type", decision.as_str());

        let resp = self.wiki.action("ManageSiteMembershipAction", params).await?;
        ensure_ok(&resp)?;
        Ok(resp)
    }
}
