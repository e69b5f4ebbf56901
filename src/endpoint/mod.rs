//! Message endpoint for UI peers
//!
//! Popup and background scripts send [`Request`]s and always get a
//! [`SpeedStatus`] back, even for requests that were ignored, so their UI can
//! stay in sync with the page.
//!
//! Requests arrive either as raw JSON through
//! [`MessageEndpoint::handle_json`] or as [`Envelope`]s on a channel served by
//! [`MessageEndpoint::serve`]. [`EndpointClient`] is the peer side of that
//! channel.

pub mod message;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::controller::{SpeedController, SpeedStatus};
use crate::error::{Error, Result};

pub use message::{Envelope, Request};

/// Dispatches peer requests to the controller
pub struct MessageEndpoint {
    controller: Arc<SpeedController>,
}

impl MessageEndpoint {
    /// Create an endpoint for `controller`
    pub fn new(controller: Arc<SpeedController>) -> Self {
        Self { controller }
    }

    /// Handle one request
    pub async fn handle(&self, request: Request) -> SpeedStatus {
        if !self.controller.is_enabled() && !request.allowed_when_disabled() {
            tracing::debug!(request = ?request, "Request ignored, controller disabled for site");
            return self.controller.status();
        }

        match request {
            Request::GetSpeedStatusFromPopup => self.controller.status(),
            Request::ToggleSiteEnablementFromPopup => {
                self.controller.toggle_site_enablement().await
            }
            Request::IncreaseSpeed => self.controller.increase().await,
            Request::DecreaseSpeed => self.controller.decrease().await,
            Request::ResetSpeed => self.controller.reset_toggle().await,
            Request::Unknown => self.controller.status(),
        }
    }

    /// Handle a JSON request and return the JSON reply
    pub async fn handle_json(&self, raw: &str) -> Result<String> {
        let status = self.handle(Request::parse(raw)).await;
        Ok(serde_json::to_string(&status)?)
    }

    /// Serve envelopes until every sender is gone
    pub async fn serve(&self, mut requests: mpsc::Receiver<Envelope>) {
        while let Some(Envelope { request, reply }) = requests.recv().await {
            let status = self.handle(request).await;
            if reply.send(status).is_err() {
                tracing::debug!(request = ?request, "Peer dropped before reply");
            }
        }

        tracing::debug!("Message endpoint closed");
    }

    /// Spawn [`serve`](Self::serve) as a background task
    pub fn spawn(self: &Arc<Self>, requests: mpsc::Receiver<Envelope>) -> JoinHandle<()> {
        let endpoint = Arc::clone(self);
        tokio::spawn(async move { endpoint.serve(requests).await })
    }
}

impl std::fmt::Debug for MessageEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageEndpoint")
            .field("status", &self.controller.status())
            .finish()
    }
}

/// Peer-side handle for sending requests to a served endpoint
#[derive(Debug, Clone)]
pub struct EndpointClient {
    tx: mpsc::Sender<Envelope>,
}

impl EndpointClient {
    /// Create a client and the receiver to hand to [`MessageEndpoint::serve`]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Envelope>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Send a request and wait for the status reply
    pub async fn request(&self, request: Request) -> Result<SpeedStatus> {
        let (envelope, reply) = Envelope::new(request);
        self.tx
            .send(envelope)
            .await
            .map_err(|_| Error::EndpointClosed)?;
        reply.await.map_err(|_| Error::EndpointClosed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tokio_test::assert_ok;

    use super::*;
    use crate::config::ControllerConfig;
    use crate::page::{SimDocument, SimOverlaySurface};
    use crate::site::Site;
    use crate::storage::{MemoryStore, StoredRecord};

    async fn endpoint(record: StoredRecord) -> (Arc<SimOverlaySurface>, Arc<MessageEndpoint>) {
        let surface = Arc::new(SimOverlaySurface::new());
        let controller = Arc::new(SpeedController::new(
            ControllerConfig::default(),
            Arc::new(SimDocument::new("https://tube.example/v/1")),
            Arc::new(MemoryStore::with_record(record)),
            surface.clone(),
        ));
        controller.load_for_site().await;
        (surface, Arc::new(MessageEndpoint::new(controller)))
    }

    fn disabled() -> StoredRecord {
        StoredRecord::with_disabled_sites(vec![Site::new("https://tube.example")])
    }

    #[tokio::test]
    async fn test_status_request() {
        let (_, endpoint) = endpoint(StoredRecord::default()).await;

        let status = endpoint.handle(Request::GetSpeedStatusFromPopup).await;

        assert_eq!(status.current_speed, 1.0);
        assert!(status.enabled_for_site);
    }

    #[tokio::test(start_paused = true)]
    async fn test_speed_commands() {
        let (surface, endpoint) = endpoint(StoredRecord::default()).await;

        assert_eq!(endpoint.handle(Request::IncreaseSpeed).await.current_speed, 1.25);
        assert_eq!(endpoint.handle(Request::DecreaseSpeed).await.current_speed, 1.0);
        assert_eq!(endpoint.handle(Request::DecreaseSpeed).await.current_speed, 0.75);
        assert_eq!(endpoint.handle(Request::ResetSpeed).await.current_speed, 1.0);
        assert_eq!(endpoint.handle(Request::ResetSpeed).await.current_speed, 0.75);
        assert_eq!(surface.history().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_site_ignores_speed_commands() {
        let (surface, endpoint) = endpoint(disabled()).await;

        for request in [
            Request::IncreaseSpeed,
            Request::DecreaseSpeed,
            Request::ResetSpeed,
            Request::Unknown,
        ] {
            let status = endpoint.handle(request).await;
            assert_eq!(status.current_speed, 1.0);
            assert!(!status.enabled_for_site);
        }
        assert!(surface.history().is_empty());

        let status = endpoint.handle(Request::GetSpeedStatusFromPopup).await;
        assert!(!status.enabled_for_site);
    }

    #[tokio::test]
    async fn test_toggle_allowed_when_disabled() {
        let mut record = disabled();
        let mut speeds = BTreeMap::new();
        speeds.insert(Site::new("https://tube.example"), 1.5);
        record.site_speeds = Some(speeds);
        let (_, endpoint) = endpoint(record).await;

        let status = endpoint.handle(Request::ToggleSiteEnablementFromPopup).await;

        assert!(status.enabled_for_site);
        assert_eq!(status.current_speed, 1.5);
    }

    #[tokio::test]
    async fn test_unknown_request() {
        let (_, endpoint) = endpoint(StoredRecord::default()).await;

        let status = endpoint.handle(Request::Unknown).await;

        assert_eq!(status.current_speed, 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_json() {
        let (_, endpoint) = endpoint(StoredRecord::default()).await;

        let reply = assert_ok!(endpoint.handle_json(r#"{"type":"increase-speed"}"#).await);
        assert_eq!(reply, r#"{"currentSpeed":1.25,"isEnabledForSite":true}"#);

        let reply = assert_ok!(endpoint.handle_json("garbage").await);
        assert_eq!(reply, r#"{"currentSpeed":1.25,"isEnabledForSite":true}"#);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_round_trip() {
        let (_, endpoint) = endpoint(StoredRecord::default()).await;
        let (client, rx) = EndpointClient::channel(8);
        let handle = endpoint.spawn(rx);

        let status = client.request(Request::IncreaseSpeed).await.unwrap();
        assert_eq!(status.current_speed, 1.25);

        let status = client.request(Request::GetSpeedStatusFromPopup).await.unwrap();
        assert_eq!(status.current_speed, 1.25);

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_client_after_endpoint_closed() {
        let (client, rx) = EndpointClient::channel(1);
        drop(rx);

        let result = client.request(Request::GetSpeedStatusFromPopup).await;
        assert!(matches!(result, Err(Error::EndpointClosed)));
    }
}
