use serde::{Deserialize, Serialize};

/// Closed taxonomy every supplier status vocabulary is mapped into.
///
/// Comparison logic only ever sees these four variants; the display string
/// ("Clarification Needed" etc.) exists solely at the presentation and
/// persistence boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NormalizedStatus {
    Accepted,
    ClarificationNeeded,
    Rejected,
    NotSet,
}

impl NormalizedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::ClarificationNeeded => "Clarification Needed",
            Self::Rejected => "Rejected",
            Self::NotSet => "Not Set",
        }
    }

    /// Parse a boundary name back into the taxonomy. Accepts the display
    /// string and common compact spellings, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = name.trim().to_lowercase();
        match key.as_str() {
            "accepted" => Some(Self::Accepted),
            "clarification" | "clarification needed" | "clarificationneeded" => {
                Some(Self::ClarificationNeeded)
            }
            "rejected" => Some(Self::Rejected),
            "not set" | "notset" => Some(Self::NotSet),
            _ => None,
        }
    }
}

impl std::fmt::Display for NormalizedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
