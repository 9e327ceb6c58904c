//! Sub-services and embedded sub-devices built during initialization.
//!
//! Each helper receives an [`ActionInvoker`] for its device rather than the
//! device itself, so it can issue actions but never touch identity or
//! lifecycle state.

mod device_properties;
mod zone_group_topology;

pub use device_properties::{
    DeviceProperties, GetLedState, GetZoneAttributes, GetZoneInfo, LedState, SetLedState,
};
pub use zone_group_topology::{GetZoneGroupAttributes, GetZoneGroupState, ZoneGroupTopology};

use serde_json::Value;

use crate::action::{Action, ActionResponse};
use crate::description::Attributes;
use crate::dispatcher::ActionInvoker;
use crate::error::Result;

/// Sub-services of an initialized device
#[derive(Debug, Clone)]
pub struct Services {
    pub device_properties: DeviceProperties,
    pub zone_group_topology: ZoneGroupTopology,
}

impl Services {
    pub(crate) fn new(invoker: &ActionInvoker) -> Self {
        Self {
            device_properties: DeviceProperties::new(invoker.clone()),
            zone_group_topology: ZoneGroupTopology::new(invoker.clone()),
        }
    }
}

/// An embedded device listed in the description's `deviceList`
/// (for a ZonePlayer: its MediaRenderer and MediaServer)
#[derive(Debug, Clone)]
pub struct SubDevice {
    device_type: String,
    udn: String,
    friendly_name: String,
    service_ids: Vec<String>,
    invoker: ActionInvoker,
}

impl SubDevice {
    /// Build one sub-device per entry of `deviceList/device`
    pub(crate) fn from_description(device: &Attributes, invoker: &ActionInvoker) -> Vec<SubDevice> {
        let entries = device
            .get("deviceList")
            .and_then(|list| list.get("device"));

        each_object(entries)
            .map(|entry| SubDevice {
                device_type: text(entry, "deviceType"),
                udn: text(entry, "UDN"),
                friendly_name: text(entry, "friendlyName"),
                service_ids: each_object(entry.get("serviceList").and_then(|s| s.get("service")))
                    .map(|service| text(service, "serviceId"))
                    .filter(|id| !id.is_empty())
                    .collect(),
                invoker: invoker.clone(),
            })
            .collect()
    }

    pub fn device_type(&self) -> &str {
        &self.device_type
    }

    pub fn udn(&self) -> &str {
        &self.udn
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    pub fn service_ids(&self) -> &[String] {
        &self.service_ids
    }

    /// Invoke an action on the parent device's address
    pub async fn invoke(&self, action: Action) -> Result<ActionResponse> {
        self.invoker.invoke(action).await
    }
}

/// A single object or an array of objects, as produced by the description parser
fn each_object(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    let items: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().filter(|v| v.is_object()).collect(),
        Some(v @ Value::Object(_)) => vec![v],
        _ => Vec::new(),
    };
    items.into_iter()
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
