use serde::{Deserialize, Serialize};
use std::fmt;

/// Provenance of a mirrored catalog record. `Offline` records were created by
/// the user while disconnected and must survive backend refreshes unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Offline,
    Backend,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Offline => "offline",
            Origin::Backend => "backend",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Origin {
    fn from(value: &str) -> Self {
        match value {
            "offline" => Origin::Offline,
            _ => Origin::Backend,
        }
    }
}
