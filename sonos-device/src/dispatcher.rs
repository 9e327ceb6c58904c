//! Action dispatch: the outbound "invoke action" collaborator.
//!
//! [`ActionDispatcher`] is the seam between the device and the wire. The
//! default [`SoapDispatcher`] sends SOAP requests through the blocking
//! `soap-client` on tokio's blocking pool. [`ActionInvoker`] narrows a
//! dispatcher to a single device address and is the only capability handed
//! to sub-services.

use std::sync::Arc;

use async_trait::async_trait;
use soap_client::SoapClient;
use tracing::{debug, warn};

use crate::action::{Action, ActionResponse};
use crate::config::DeviceConfig;
use crate::error::{DeviceError, Result};

/// Sends a named remote action to a device and returns its output arguments
#[async_trait]
pub trait ActionDispatcher: Send + Sync {
    /// Invoke `action` on the device at `address`
    async fn dispatch(&self, address: &str, action: Action) -> Result<ActionResponse>;
}

/// Dispatcher backed by the SOAP client
#[derive(Debug, Clone)]
pub struct SoapDispatcher {
    client: SoapClient,
    port: u16,
}

impl SoapDispatcher {
    /// Dispatcher with default timeouts talking to port 1400
    pub fn new() -> Self {
        Self::from_config(&DeviceConfig::default())
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            client: SoapClient::with_timeouts(config.connect_timeout, config.read_timeout),
            port: config.soap_port,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for SoapDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionDispatcher for SoapDispatcher {
    async fn dispatch(&self, address: &str, action: Action) -> Result<ActionResponse> {
        let client = self.client.clone();
        let host = address.to_string();
        let port = self.port;

        tokio::task::spawn_blocking(move || -> Result<ActionResponse> {
            let info = action.service.info();
            let payload = action.params.to_payload();
            let element = client.call(
                &host,
                port,
                info.endpoint,
                info.service_uri,
                action.name,
                &payload,
            )?;
            Ok(ActionResponse::from(soap_client::output_arguments(&element)))
        })
        .await
        .map_err(|e| DeviceError::RuntimeError(format!("SOAP task failed: {}", e)))?
    }
}

/// A dispatcher bound to one device address
///
/// Cloning is cheap. Holders can invoke actions on the device but cannot see
/// or change any other device state.
#[derive(Clone)]
pub struct ActionInvoker {
    address: Arc<str>,
    dispatcher: Arc<dyn ActionDispatcher>,
}

impl ActionInvoker {
    pub fn new(address: impl Into<Arc<str>>, dispatcher: Arc<dyn ActionDispatcher>) -> Self {
        Self {
            address: address.into(),
            dispatcher,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub async fn invoke(&self, action: Action) -> Result<ActionResponse> {
        debug!(address = %self.address, action = %action, params = action.params.len(), "Dispatching action");
        let label = action.to_string();
        let result = self.dispatcher.dispatch(&self.address, action).await;
        if let Err(e) = &result {
            warn!(address = %self.address, action = %label, error = %e, "Action failed");
        }
        result
    }
}

impl std::fmt::Debug for ActionInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionInvoker")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
