//! Session record

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use loan_assist_core::{LanguageCode, Turn};

use crate::state::ConversationState;

/// One user's conversation. This is the persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// UI label language; never a translation target
    #[serde(default)]
    pub display_language: Option<LanguageCode>,
    /// Language of the most recent delivered turn
    #[serde(default)]
    pub detected_language: Option<LanguageCode>,
    #[serde(default)]
    pub state: ConversationState,
    #[serde(default)]
    pub turns: Vec<Turn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>, display_language: Option<LanguageCode>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            display_language,
            detected_language: None,
            state: ConversationState::new(),
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    /// True when nothing has happened for longer than `timeout`
    pub fn is_idle(&self, timeout: Duration, now: DateTime<Utc>) -> bool {
        let idle = now.signed_duration_since(self.updated_at);
        idle.to_std().map(|idle| idle > timeout).unwrap_or(false)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            turn_count: self.turn_count(),
            detected_language: self.detected_language,
            updated_at: self.updated_at,
        }
    }
}

/// Listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub turn_count: usize,
    pub detected_language: Option<LanguageCode>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_detection() {
        let session = Session::new("s1", None);
        let now = session.updated_at;
        assert!(!session.is_idle(Duration::from_secs(60), now));
        assert!(session.is_idle(Duration::from_secs(60), now + chrono::Duration::seconds(61)));
        // Clock skew never counts as idle
        assert!(!session.is_idle(Duration::from_secs(0), now - chrono::Duration::seconds(5)));
    }

    #[test]
    fn test_session_serde_round_trip() {
        let session = Session::new("s1", Some(LanguageCode::Tamil));
        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }
}
