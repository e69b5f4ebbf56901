//! Message types exchanged with UI peers
//!
//! Requests are JSON objects tagged by `type`:
//!
//! ```json
//! {"type": "increase-speed"}
//! ```
//!
//! Every request is answered with a [`SpeedStatus`](crate::controller::SpeedStatus).

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::controller::SpeedStatus;

/// Request from a popup or background peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Request {
    /// Popup asking for the current state
    GetSpeedStatusFromPopup,
    /// Popup flipping enablement for the site
    ToggleSiteEnablementFromPopup,
    /// Speed up one step
    IncreaseSpeed,
    /// Slow down one step
    DecreaseSpeed,
    /// Toggle between normal and last speed
    ResetSpeed,
    /// Any type this endpoint does not know
    #[serde(other)]
    Unknown,
}

impl Request {
    /// Parse a JSON request. Malformed input is treated as [`Request::Unknown`].
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(error = %e, "Malformed request");
                Request::Unknown
            }
        }
    }

    /// Whether the request is honored while the controller is disabled
    pub fn allowed_when_disabled(&self) -> bool {
        matches!(
            self,
            Request::GetSpeedStatusFromPopup | Request::ToggleSiteEnablementFromPopup
        )
    }
}

/// A request paired with the channel its reply goes to
#[derive(Debug)]
pub struct Envelope {
    /// The request
    pub request: Request,
    /// Where to send the status reply
    pub reply: oneshot::Sender<SpeedStatus>,
}

impl Envelope {
    /// Create an envelope and the receiver for its reply
    pub fn new(request: Request) -> (Self, oneshot::Receiver<SpeedStatus>) {
        let (reply, rx) = oneshot::channel();
        (Self { request, reply }, rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_types() {
        assert_eq!(
            Request::parse(r#"{"type":"get-speed-status-from-popup"}"#),
            Request::GetSpeedStatusFromPopup
        );
        assert_eq!(
            Request::parse(r#"{"type":"toggle-site-enablement-from-popup"}"#),
            Request::ToggleSiteEnablementFromPopup
        );
        assert_eq!(
            Request::parse(r#"{"type":"increase-speed"}"#),
            Request::IncreaseSpeed
        );
        assert_eq!(
            Request::parse(r#"{"type":"decrease-speed"}"#),
            Request::DecreaseSpeed
        );
        assert_eq!(
            Request::parse(r#"{"type":"reset-speed"}"#),
            Request::ResetSpeed
        );
    }

    #[test]
    fn test_parse_unknown_and_malformed() {
        assert_eq!(
            Request::parse(r#"{"type":"open-settings"}"#),
            Request::Unknown
        );
        assert_eq!(Request::parse(r#"{"kind":"increase-speed"}"#), Request::Unknown);
        assert_eq!(Request::parse("not json"), Request::Unknown);
    }

    #[test]
    fn test_extra_fields_ignored() {
        assert_eq!(
            Request::parse(r#"{"type":"increase-speed","source":"keyboard"}"#),
            Request::IncreaseSpeed
        );
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&Request::ResetSpeed).unwrap();
        assert_eq!(json, r#"{"type":"reset-speed"}"#);
    }

    #[test]
    fn test_classification() {
        assert!(Request::GetSpeedStatusFromPopup.allowed_when_disabled());
        assert!(Request::ToggleSiteEnablementFromPopup.allowed_when_disabled());
        assert!(!Request::IncreaseSpeed.allowed_when_disabled());
        assert!(!Request::Unknown.allowed_when_disabled());
    }
}
