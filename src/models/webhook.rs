//! Polka billing webhook payloads

use serde::Deserialize;

/// The only event type that changes state
pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

#[derive(Debug, Deserialize)]
pub struct PolkaEvent {
    pub event: String,
    #[serde(default)]
    pub data: PolkaEventData,
}

#[derive(Debug, Default, Deserialize)]
pub struct PolkaEventData {
    /// Kept as a string so unknown events with odd payloads stay no-ops
    #[serde(default)]
    pub user_id: String,
}
