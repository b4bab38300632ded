use serde::{Deserialize, Serialize};

/// Identity a session's changes are attributed to.
///
/// A plain display name is enough for the markup; the richer fields exist so
/// a facade backed by a directory provider can round-trip its identity record
/// through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorIdentity {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Directory-provider id (e.g. "AD", "None").
    #[serde(default)]
    pub provider_id: Option<String>,
    /// Stable unique id within the provider.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl AuthorIdentity {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            provider_id: None,
            user_id: None,
        }
    }
}

impl From<&str> for AuthorIdentity {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for AuthorIdentity {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}
