//! The device lifecycle controller.
//!
//! A [`Device`] is created from a [`DeviceSeed`] handed over by discovery,
//! enriched once by [`Device::init`], kept alive by [`Device::refresh`] and
//! reports every lifecycle transition on a broadcast channel.
//!
//! ```text
//! Uninitialized ──init──▶ Initializing ──ok──▶ Ready ◀──refresh── Expired
//!                              │                  └────timer────────▲
//!                              └──err──▶ Failed ──init──▶ Initializing
//! ```

mod commands;

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::DeviceConfig;
use crate::description::{Attributes, Description, DescriptionFetcher, HttpDescriptionFetcher};
use crate::dispatcher::{ActionDispatcher, ActionInvoker, SoapDispatcher};
use crate::error::{DeviceError, Result};
use crate::event::DeviceEvent;
use crate::expiry::ExpiryTimer;
use crate::services::{Services, SubDevice};

/// Minimal record produced by discovery
///
/// `address` and `descriptor_location` become typed identity fields on the
/// device. Every other field is kept verbatim in the device's attribute bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSeed {
    pub address: String,
    pub descriptor_location: String,
    #[serde(flatten)]
    pub extra: Attributes,
}

impl DeviceSeed {
    pub fn new(address: impl Into<String>, descriptor_location: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            descriptor_location: descriptor_location.into(),
            extra: Attributes::new(),
        }
    }

    /// Seed from a description URL such as `http://192.168.1.100:1400/xml/device_description.xml`,
    /// using its host as the device address
    pub fn from_location(location: &str) -> Result<Self> {
        let url = url::Url::parse(location)
            .map_err(|e| DeviceError::ParseError(format!("Invalid location '{}': {}", location, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| DeviceError::ParseError(format!("Location '{}' has no host", location)))?;

        Ok(Self::new(host, location))
    }

    /// Add a pass-through field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Lifecycle state of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceState {
    /// Constructed, `init` not yet called
    Uninitialized,
    /// Description fetch in flight
    Initializing,
    /// Attributes and services are available and the expiry timer is armed
    Ready,
    /// The expiry window elapsed without a refresh
    Expired,
    /// Initialization failed; `init` may be called again
    Failed,
}

struct Lifecycle {
    state: DeviceState,
    timer: ExpiryTimer,
}

struct DeviceInner {
    address: String,
    descriptor_location: String,
    config: DeviceConfig,
    invoker: ActionInvoker,
    fetcher: Arc<dyn DescriptionFetcher>,
    attributes: RwLock<Attributes>,
    services: OnceLock<Services>,
    sub_devices: OnceLock<Vec<SubDevice>>,
    lifecycle: Mutex<Lifecycle>,
    events: broadcast::Sender<DeviceEvent>,
}

/// A single networked media player
///
/// Cloning yields another handle to the same device. When the last handle is
/// dropped the pending expiry, if any, is aborted.
#[derive(Clone)]
pub struct Device {
    inner: Arc<DeviceInner>,
}

impl Device {
    /// Create a device with the default configuration and the given collaborators
    ///
    /// No network traffic and no timers until [`init`](Self::init).
    pub fn new(
        seed: DeviceSeed,
        dispatcher: Arc<dyn ActionDispatcher>,
        fetcher: Arc<dyn DescriptionFetcher>,
    ) -> Self {
        Self::from_parts(seed, DeviceConfig::default(), dispatcher, fetcher)
    }

    pub fn builder(seed: DeviceSeed) -> DeviceBuilder {
        DeviceBuilder::new(seed)
    }

    fn from_parts(
        seed: DeviceSeed,
        config: DeviceConfig,
        dispatcher: Arc<dyn ActionDispatcher>,
        fetcher: Arc<dyn DescriptionFetcher>,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer_size.max(1));
        let invoker = ActionInvoker::new(seed.address.as_str(), dispatcher);

        Self {
            inner: Arc::new(DeviceInner {
                address: seed.address,
                descriptor_location: seed.descriptor_location,
                config,
                invoker,
                fetcher,
                attributes: RwLock::new(seed.extra),
                services: OnceLock::new(),
                sub_devices: OnceLock::new(),
                lifecycle: Mutex::new(Lifecycle {
                    state: DeviceState::Uninitialized,
                    timer: ExpiryTimer::new(),
                }),
                events,
            }),
        }
    }

    /// Subscribe to lifecycle events; dropping the receiver unsubscribes
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.inner.events.subscribe()
    }

    /// Start initialization in the background
    ///
    /// The outcome is reported as [`DeviceEvent::Ready`] or
    /// [`DeviceEvent::Error`]. The returned handle may be ignored.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the device is not `Uninitialized` or `Failed`,
    /// `RuntimeError` when called outside a tokio runtime.
    pub fn init(&self) -> Result<JoinHandle<()>> {
        let runtime = current_runtime("init")?;
        let guard = self.begin_init()?;

        let device = self.clone();
        Ok(runtime.spawn(async move {
            // Failures are reported through the Error event
            let _ = device.run_init(guard).await;
        }))
    }

    /// Initialize and wait for the outcome
    ///
    /// Subscribers see the same events as with [`init`](Self::init).
    pub async fn initialize(&self) -> Result<()> {
        let guard = self.begin_init()?;
        self.run_init(guard).await
    }

    fn begin_init(&self) -> Result<InitGuard> {
        let mut lifecycle = self.inner.lifecycle.lock();
        match lifecycle.state {
            DeviceState::Uninitialized | DeviceState::Failed => {
                lifecycle.state = DeviceState::Initializing;
                debug!(address = %self.inner.address, location = %self.inner.descriptor_location, "Initializing device");
                Ok(InitGuard::new(self.clone()))
            }
            state => {
                warn!(address = %self.inner.address, ?state, "Ignoring init on a device that is not idle");
                Err(DeviceError::InvalidState {
                    operation: "initialize",
                    state,
                })
            }
        }
    }

    async fn run_init(&self, mut guard: InitGuard) -> Result<()> {
        let fetched = self
            .inner
            .fetcher
            .fetch(&self.inner.descriptor_location)
            .await;
        guard.disarm();

        let outcome = fetched.and_then(|description| {
            let runtime = current_runtime("arm the expiry timer")?;
            self.complete_init(description, &runtime);
            Ok(())
        });

        if let Err(e) = &outcome {
            let mut lifecycle = self.inner.lifecycle.lock();
            lifecycle.state = DeviceState::Failed;
            warn!(address = %self.inner.address, error = %e, "Device initialization failed");
            self.emit(DeviceEvent::Error(e.clone()));
        }

        outcome
    }

    /// Attributes, services and `Ready` are published under the lifecycle lock
    fn complete_init(&self, description: Description, runtime: &Handle) {
        let invoker = &self.inner.invoker;
        let sub_devices = SubDevice::from_description(&description.device, invoker);
        let services = Services::new(invoker);

        let mut lifecycle = self.inner.lifecycle.lock();
        {
            let mut attributes = self.inner.attributes.write();
            for (key, value) in description.device {
                attributes.insert(key, value);
            }
        }
        let _ = self.inner.sub_devices.set(sub_devices);
        let _ = self.inner.services.set(services);

        self.arm(&mut lifecycle, runtime, self.inner.config.expiry_interval);
        lifecycle.state = DeviceState::Ready;
        info!(
            address = %self.inner.address,
            sub_devices = self.sub_devices().len(),
            "Device ready"
        );
        self.emit(DeviceEvent::Ready);
    }

    /// Push the expiry out by the configured interval
    pub fn refresh(&self) -> Result<()> {
        self.refresh_for(self.inner.config.expiry_interval)
    }

    /// Cancel the pending expiry and schedule a new one after `duration`
    ///
    /// Emits [`DeviceEvent::Refreshed`] before returning. An expired device
    /// becomes `Ready` again.
    pub fn refresh_for(&self, duration: Duration) -> Result<()> {
        let runtime = current_runtime("refresh")?;

        let mut lifecycle = self.inner.lifecycle.lock();
        self.arm(&mut lifecycle, &runtime, duration);
        if lifecycle.state == DeviceState::Expired {
            lifecycle.state = DeviceState::Ready;
        }
        debug!(address = %self.inner.address, seconds = duration.as_secs_f64(), "Device refreshed");
        self.emit(DeviceEvent::Refreshed);

        Ok(())
    }

    fn arm(&self, lifecycle: &mut Lifecycle, runtime: &Handle, after: Duration) {
        let device = Arc::downgrade(&self.inner);
        lifecycle.timer.schedule(runtime, after, move |generation| {
            if let Some(inner) = device.upgrade() {
                Device { inner }.expire(generation);
            }
        });
    }

    fn expire(&self, generation: u64) {
        let mut lifecycle = self.inner.lifecycle.lock();
        if !lifecycle.timer.fire(generation) {
            trace!(address = %self.inner.address, generation, "Superseded expiry ignored");
            return;
        }

        if lifecycle.state == DeviceState::Ready {
            lifecycle.state = DeviceState::Expired;
        }
        info!(address = %self.inner.address, "Device expired");
        self.emit(DeviceEvent::Expired);
    }

    fn emit(&self, event: DeviceEvent) {
        // No receivers is not an error
        if self.inner.events.send(event).is_err() {
            trace!(address = %self.inner.address, "No subscribers for device event");
        }
    }

    pub fn address(&self) -> &str {
        &self.inner.address
    }

    pub fn descriptor_location(&self) -> &str {
        &self.inner.descriptor_location
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.inner.config
    }

    pub fn state(&self) -> DeviceState {
        self.inner.lifecycle.lock().state
    }

    /// Snapshot of the attribute bag
    pub fn attributes(&self) -> Attributes {
        self.inner.attributes.read().clone()
    }

    pub fn attribute(&self, key: &str) -> Option<Value> {
        self.inner.attributes.read().get(key).cloned()
    }

    /// Sub-services, available once the device has been ready
    pub fn services(&self) -> Option<&Services> {
        self.inner.services.get()
    }

    pub fn sub_devices(&self) -> &[SubDevice] {
        self.inner
            .sub_devices
            .get()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Capability to invoke actions on this device's address
    pub fn invoker(&self) -> ActionInvoker {
        self.inner.invoker.clone()
    }

    /// When the pending expiry is due
    pub fn expires_at(&self) -> Option<Instant> {
        self.inner.lifecycle.lock().timer.deadline()
    }

    pub fn is_timer_armed(&self) -> bool {
        self.inner.lifecycle.lock().timer.is_armed()
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("address", &self.inner.address)
            .field("descriptor_location", &self.inner.descriptor_location)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Puts a device left in `Initializing` back to `Uninitialized` when the
/// initialization task is dropped before the description resolves
struct InitGuard {
    device: Device,
    armed: bool,
}

impl InitGuard {
    fn new(device: Device) -> Self {
        Self {
            device,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InitGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let inner = &self.device.inner;
        let mut lifecycle = inner.lifecycle.lock();
        if lifecycle.state == DeviceState::Initializing {
            lifecycle.state = DeviceState::Uninitialized;
            debug!(address = %inner.address, "Initialization cancelled before the description arrived");
        }
    }
}

fn current_runtime(operation: &str) -> Result<Handle> {
    Handle::try_current().map_err(|e| {
        DeviceError::RuntimeError(format!("Cannot {} outside a tokio runtime: {}", operation, e))
    })
}

/// Builder for a [`Device`] with custom configuration or collaborators
///
/// Collaborators not provided default to [`SoapDispatcher`] and
/// [`HttpDescriptionFetcher`] built from the configuration.
pub struct DeviceBuilder {
    seed: DeviceSeed,
    config: DeviceConfig,
    dispatcher: Option<Arc<dyn ActionDispatcher>>,
    fetcher: Option<Arc<dyn DescriptionFetcher>>,
}

impl DeviceBuilder {
    pub fn new(seed: DeviceSeed) -> Self {
        Self {
            seed,
            config: DeviceConfig::default(),
            dispatcher: None,
            fetcher: None,
        }
    }

    pub fn with_config(mut self, config: DeviceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn ActionDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn DescriptionFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// # Errors
    ///
    /// `ConfigurationError` if the configuration is invalid, `NetworkError`
    /// if the default HTTP client cannot be created.
    pub fn build(self) -> Result<Device> {
        self.config.validate()?;

        let dispatcher = match self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => Arc::new(SoapDispatcher::from_config(&self.config)),
        };
        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpDescriptionFetcher::from_config(&self.config)?),
        };

        Ok(Device::from_parts(self.seed, self.config, dispatcher, fetcher))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, ActionResponse};
    use async_trait::async_trait;
    use serde_json::json;

    struct NoopDispatcher;

    #[async_trait]
    impl ActionDispatcher for NoopDispatcher {
        async fn dispatch(&self, _address: &str, _action: Action) -> Result<ActionResponse> {
            Ok(ActionResponse::new())
        }
    }

    struct FixedFetcher(Result<Description>);

    #[async_trait]
    impl DescriptionFetcher for FixedFetcher {
        async fn fetch(&self, _location: &str) -> Result<Description> {
            self.0.clone()
        }
    }

    fn device_with(fetched: Result<Description>) -> Device {
        Device::new(
            DeviceSeed::new("10.0.0.5", "http://10.0.0.5/desc.xml"),
            Arc::new(NoopDispatcher),
            Arc::new(FixedFetcher(fetched)),
        )
    }

    fn description(value: Value) -> Description {
        match value {
            Value::Object(device) => Description::new(device),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_seed_from_location() {
        let seed = DeviceSeed::from_location("http://192.168.1.100:1400/xml/device_description.xml").unwrap();
        assert_eq!(seed.address, "192.168.1.100");
        assert_eq!(seed.descriptor_location, "http://192.168.1.100:1400/xml/device_description.xml");

        assert!(DeviceSeed::from_location("not a url").is_err());
    }

    #[test]
    fn test_seed_deserializes_extra_fields() {
        let seed: DeviceSeed = serde_json::from_value(json!({
            "address": "10.0.0.5",
            "descriptorLocation": "http://10.0.0.5/desc.xml",
            "householdId": "Sonos_abc"
        }))
        .unwrap();

        assert_eq!(seed.address, "10.0.0.5");
        assert_eq!(seed.extra.get("householdId"), Some(&json!("Sonos_abc")));
        assert_eq!(seed.extra.len(), 1);
    }

    #[test]
    fn test_construction_has_no_side_effects() {
        let device = device_with(Ok(Description::default()));
        assert_eq!(device.state(), DeviceState::Uninitialized);
        assert!(device.services().is_none());
        assert!(device.sub_devices().is_empty());
        assert!(!device.is_timer_armed());
    }

    #[test]
    fn test_refresh_outside_runtime_fails() {
        let device = device_with(Ok(Description::default()));
        assert!(matches!(device.refresh(), Err(DeviceError::RuntimeError(_))));
        assert!(matches!(device.init(), Err(DeviceError::RuntimeError(_))));
        assert_eq!(device.state(), DeviceState::Uninitialized);
    }

    #[tokio::test]
    async fn test_descriptor_cannot_override_identity() {
        let device = device_with(Ok(description(json!({
            "address": "10.9.9.9",
            "modelName": "Sonos One"
        }))));

        device.initialize().await.unwrap();

        assert_eq!(device.address(), "10.0.0.5");
        assert_eq!(device.attribute("address"), Some(json!("10.9.9.9")));
        assert_eq!(device.invoker().address(), "10.0.0.5");
    }

    #[tokio::test]
    async fn test_second_init_is_rejected() {
        let device = device_with(Ok(description(json!({"modelName": "Sonos One"}))));
        device.initialize().await.unwrap();

        let result = device.initialize().await;
        assert_eq!(
            result,
            Err(DeviceError::InvalidState {
                operation: "initialize",
                state: DeviceState::Ready,
            })
        );
    }

    #[tokio::test]
    async fn test_failed_device_can_be_initialized_again() {
        let device = device_with(Err(DeviceError::NetworkError("unreachable".to_string())));
        assert!(device.initialize().await.is_err());
        assert_eq!(device.state(), DeviceState::Failed);

        assert!(device.initialize().await.is_err());
        assert_eq!(device.state(), DeviceState::Failed);
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = Device::builder(DeviceSeed::new("10.0.0.5", "http://10.0.0.5/desc.xml"))
            .with_config(DeviceConfig::new().with_expiry_interval(Duration::ZERO))
            .with_dispatcher(Arc::new(NoopDispatcher))
            .build();

        assert!(matches!(result, Err(DeviceError::ConfigurationError(_))));
    }
}
