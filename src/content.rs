//! Content script runtime
//!
//! Wires the controller, watcher and message endpoint together for one page
//! and runs them as background tasks, the same way the script behaves once
//! injected: observe the body, load the site's settings, answer peers.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::ControllerConfig;
use crate::controller::{SpeedController, SpeedStatus};
use crate::endpoint::{EndpointClient, MessageEndpoint};
use crate::page::{Document, MutationEvent, OverlaySurface};
use crate::storage::SiteStore;
use crate::watcher::ChangeWatcher;

/// A running content script
pub struct ContentScript {
    controller: Arc<SpeedController>,
    watcher: Arc<ChangeWatcher>,
    client: EndpointClient,
    watcher_task: JoinHandle<()>,
    endpoint_task: JoinHandle<()>,
}

impl ContentScript {
    /// Start the script on a page
    ///
    /// Performs the initial load before returning, then keeps reacting to
    /// `mutations` and to requests sent through [`client`](Self::client).
    pub async fn start(
        config: ControllerConfig,
        document: Arc<dyn Document>,
        store: Arc<dyn SiteStore>,
        overlay_surface: Arc<dyn OverlaySurface>,
        mutations: mpsc::Receiver<MutationEvent>,
    ) -> Self {
        let queue_size = config.message_queue_size;
        let controller = Arc::new(SpeedController::new(
            config,
            document,
            store,
            overlay_surface,
        ));

        // Track the location before the first load so a navigation during
        // the load is still picked up.
        let watcher = Arc::new(ChangeWatcher::new(Arc::clone(&controller)));
        let watcher_task = watcher.spawn(mutations);

        let status = controller.load_for_site().await;
        tracing::info!(
            speed = status.current_speed,
            enabled = status.enabled_for_site,
            "Content script started"
        );

        let endpoint = Arc::new(MessageEndpoint::new(Arc::clone(&controller)));
        let (client, requests) = EndpointClient::channel(queue_size);
        let endpoint_task = endpoint.spawn(requests);

        Self {
            controller,
            watcher,
            client,
            watcher_task,
            endpoint_task,
        }
    }

    /// Get the controller
    pub fn controller(&self) -> &Arc<SpeedController> {
        &self.controller
    }

    /// Get the change watcher
    pub fn watcher(&self) -> &Arc<ChangeWatcher> {
        &self.watcher
    }

    /// Get a client for sending requests to the endpoint
    pub fn client(&self) -> EndpointClient {
        self.client.clone()
    }

    /// Current status
    pub fn status(&self) -> SpeedStatus {
        self.controller.status()
    }

    /// Stop the background tasks and dismiss the overlay
    pub fn shutdown(self) {
        self.watcher_task.abort();
        self.endpoint_task.abort();
        self.controller.overlay().dismiss();
        tracing::debug!("Content script stopped");
    }
}

impl std::fmt::Debug for ContentScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentScript")
            .field("controller", &self.controller)
            .finish()
    }
}
