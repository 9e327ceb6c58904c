//! Lifecycle, expiry and typed action dispatch for a single Sonos device
//!
//! A [`Device`] is built from the seed record discovery produces, enriched
//! once from its UPnP description, kept alive by periodic refreshes and
//! controlled through typed commands. Lifecycle transitions are published on
//! a broadcast channel:
//!
//! ```rust,ignore
//! use sonos_device::{Device, DeviceEvent, DeviceSeed};
//!
//! let seed = DeviceSeed::from_location("http://192.168.1.100:1400/xml/device_description.xml")?;
//! let device = Device::builder(seed).build()?;
//! let mut events = device.subscribe();
//!
//! device.init()?;
//! if let Ok(DeviceEvent::Ready) = events.recv().await {
//!     device.set_volume(25).await?;
//!     device.play().await?;
//! }
//!
//! // Call on every presence signal, e.g. an SSDP alive notification
//! device.refresh()?;
//! ```
//!
//! Without a refresh the device emits [`DeviceEvent::Expired`] after the
//! configured interval (30 minutes by default).

pub mod action;
pub mod command;
pub mod config;
pub mod description;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod logging;
pub mod service;
pub mod services;

mod expiry;

pub use action::{Action, ActionParams, ActionResponse, ParamValue};
pub use command::{Command, PlayMode};
pub use config::DeviceConfig;
pub use description::{Attributes, Description, DescriptionFetcher, HttpDescriptionFetcher};
pub use device::{Device, DeviceBuilder, DeviceSeed, DeviceState};
pub use dispatcher::{ActionDispatcher, ActionInvoker, SoapDispatcher};
pub use error::{DeviceError, Result};
pub use event::{DeviceEvent, EventKind};
pub use service::{Service, ServiceInfo};
pub use services::{DeviceProperties, LedState, Services, SubDevice, ZoneGroupTopology};
