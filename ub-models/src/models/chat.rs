//! Two-party chat entity.

use serde::{Deserialize, Serialize};

/// A conversation between a user and a station account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub users: Vec<String>,
}

impl Chat {
    /// A chat is well formed when it has exactly two participants.
    pub fn is_well_formed(&self) -> bool {
        self.users.len() == 2
    }

    /// The participant that is not `me`. For a chat with oneself, returns `me`.
    pub fn counterpart(&self, me: &str) -> Option<&str> {
        if !self.is_well_formed() {
            return None;
        }
        self.users
            .iter()
            .find(|u| u.as_str() != me)
            .or_else(|| self.users.iter().find(|u| u.as_str() == me))
            .map(String::as_str)
    }

    pub fn involves(&self, identity: &str) -> bool {
        self.users.iter().any(|u| u == identity)
    }
}
