use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The visitor's persisted decision
///
/// `Unset` is never stored; it is the reading of an absent (or expired)
/// record. Only `Accepted`/`Rejected` have a stored encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentStatus {
    Unset,
    Accepted,
    Rejected,
}

impl ConsentStatus {
    /// Interpret a raw stored value
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("accepted") => Self::Accepted,
            Some("rejected") => Self::Rejected,
            // Unknown stored values read as no decision
            _ => Self::Unset,
        }
    }

    /// Stored encoding; `None` for `Unset`
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            Self::Unset => None,
            Self::Accepted => Some("accepted"),
            Self::Rejected => Some("rejected"),
        }
    }
}

/// Immutable payload broadcast on every transition; never persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentEvent {
    pub status: ConsentStatus,
    /// Serializes as an ISO-8601 timestamp
    pub timestamp: DateTime<Utc>,
}

impl ConsentEvent {
    pub fn now(status: ConsentStatus) -> Self {
        Self {
            status,
            timestamp: Utc::now(),
        }
    }
}
