use crate::name::{is_normal, normalize};
use serde::{Deserialize, Serialize};

/// A platform account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Numeric account id, when the page it was scraped from exposed one.
    pub id: Option<String>,
    /// Name as shown on the site, when it differs from the unix name.
    pub display_name: Option<String>,
    pub unix_name: String,
}

impl User {
    /// Build from either form of the name. A name that is already canonical
    /// is taken as the unix name; anything else is kept as the display name
    /// and normalized.
    pub fn new(name: &str, id: Option<&str>) -> Self {
        let id = id.filter(|s| !s.is_empty()).map(str::to_string);
        if is_normal(name, false) {
            Self {
                id,
                display_name: None,
                unix_name: name.to_string(),
            }
        } else {
            Self {
                id,
                display_name: Some(name.to_string()),
                unix_name: normalize(name),
            }
        }
    }

    /// Display name if known, otherwise the unix name.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.unix_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name_is_unix_name() {
        let user = User::new("some-user", Some("42"));
        assert_eq!(user.id.as_deref(), Some("42"));
        assert_eq!(user.unix_name, "some-user");
        assert!(user.display_name.is_none());
        assert_eq!(user.name(), "some-user");
    }

    #[test]
    fn test_display_name_is_normalized() {
        let user = User::new("Dr Clef", None);
        assert_eq!(user.display_name.as_deref(), Some("Dr Clef"));
        assert_eq!(user.unix_name, "dr-clef");
        assert_eq!(user.name(), "Dr Clef");
        assert!(user.id.is_none());
    }

    #[test]
    fn test_empty_id_is_none() {
        assert!(User::new("x", Some("")).id.is_none());
    }
}
