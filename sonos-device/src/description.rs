//! Device description retrieval: the outbound "fetch description" collaborator.
//!
//! The UPnP description document is treated as an opaque attribute bag. The
//! `<device>` element is folded into a JSON object: leaf elements become
//! strings, nested elements become objects, and repeated siblings collapse
//! into arrays.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use xmltree::{Element, XMLNode};

use crate::config::DeviceConfig;
use crate::error::{DeviceError, Result};

/// Open attribute bag merged into a device during initialization
pub type Attributes = Map<String, Value>;

/// Structured result of a description fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Description {
    /// Attributes of the root `<device>` element
    pub device: Attributes,
}

impl Description {
    pub fn new(device: Attributes) -> Self {
        Self { device }
    }

    /// Parse a UPnP device description document
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::ParseError` if the XML is malformed or has no
    /// `<device>` element.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let root = Element::parse(xml.as_bytes())
            .map_err(|e| DeviceError::ParseError(format!("Failed to parse device XML: {}", e)))?;

        let device = root
            .get_child("device")
            .ok_or_else(|| DeviceError::ParseError("Missing <device> element".to_string()))?;

        match element_to_value(device) {
            Value::Object(attributes) => Ok(Self::new(attributes)),
            _ => Err(DeviceError::ParseError("Empty <device> element".to_string())),
        }
    }
}

/// Retrieves descriptive metadata for a device from its description location
#[async_trait]
pub trait DescriptionFetcher: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<Description>;
}

/// Description fetcher over HTTP
#[derive(Debug, Clone)]
pub struct HttpDescriptionFetcher {
    http_client: reqwest::Client,
}

impl HttpDescriptionFetcher {
    /// Create a fetcher with the given overall request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeviceError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    pub fn from_config(config: &DeviceConfig) -> Result<Self> {
        Self::new(config.description_timeout)
    }
}

#[async_trait]
impl DescriptionFetcher for HttpDescriptionFetcher {
    async fn fetch(&self, location: &str) -> Result<Description> {
        debug!(location, "Fetching device description");

        let response = self
            .http_client
            .get(location)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DeviceError::NetworkError(format!("Failed to fetch device description: {}", e)))?;

        let xml = response
            .text()
            .await
            .map_err(|e| DeviceError::NetworkError(format!("Failed to read response body: {}", e)))?;

        Description::from_xml(&xml)
    }
}

fn element_to_value(element: &Element) -> Value {
    let children: Vec<&Element> = element
        .children
        .iter()
        .filter_map(|node| match node {
            XMLNode::Element(child) => Some(child),
            _ => None,
        })
        .collect();

    if children.is_empty() {
        let text = element
            .get_text()
            .map(|t| t.trim().to_string())
            .unwrap_or_default();
        return Value::String(text);
    }

    let mut map = Map::new();
    for child in children {
        insert_merging(&mut map, child.name.clone(), element_to_value(child));
    }
    Value::Object(map)
}

fn insert_merging(map: &mut Attributes, key: String, value: Value) {
    match map.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DESCRIPTION: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <device>
    <deviceType>urn:schemas-upnp-org:device:ZonePlayer:1</deviceType>
    <friendlyName>192.168.1.50 - Sonos One</friendlyName>
    <modelName>Sonos One</modelName>
    <UDN>uuid:RINCON_000E58A0123456</UDN>
    <roomName>Kitchen</roomName>
    <serviceList>
      <service><serviceId>urn:upnp-org:serviceId:AlarmClock</serviceId></service>
      <service><serviceId>urn:upnp-org:serviceId:DeviceProperties</serviceId></service>
    </serviceList>
  </device>
</root>"#;

    #[test]
    fn test_description_from_xml() {
        let description = Description::from_xml(DESCRIPTION).unwrap();

        assert_eq!(description.device["modelName"], json!("Sonos One"));
        assert_eq!(description.device["roomName"], json!("Kitchen"));
        assert_eq!(description.device["UDN"], json!("uuid:RINCON_000E58A0123456"));
    }

    #[test]
    fn test_repeated_elements_become_arrays() {
        let description = Description::from_xml(DESCRIPTION).unwrap();

        let services = &description.device["serviceList"]["service"];
        assert_eq!(
            services,
            &json!([
                {"serviceId": "urn:upnp-org:serviceId:AlarmClock"},
                {"serviceId": "urn:upnp-org:serviceId:DeviceProperties"},
            ])
        );
    }

    #[test]
    fn test_missing_device_element() {
        let xml = r#"<root><specVersion><major>1</major></specVersion></root>"#;
        match Description::from_xml(xml) {
            Err(DeviceError::ParseError(msg)) => assert!(msg.contains("Missing <device>")),
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            Description::from_xml("<root><device>"),
            Err(DeviceError::ParseError(_))
        ));
    }

    #[test]
    fn test_insert_merging_three_siblings() {
        let mut map = Attributes::new();
        insert_merging(&mut map, "a".into(), json!("1"));
        insert_merging(&mut map, "a".into(), json!("2"));
        insert_merging(&mut map, "a".into(), json!("3"));
        assert_eq!(map["a"], json!(["1", "2", "3"]));
    }
}
