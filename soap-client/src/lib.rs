//! Private SOAP client for UPnP action invocation
//!
//! This crate provides a minimal blocking SOAP client for sending UPnP control
//! actions to devices like Sonos speakers and reading back their output
//! arguments. Callers in async code are expected to run it on a blocking
//! thread.

mod error;

pub use error::SoapError;

use std::time::Duration;
use xmltree::{Element, XMLNode};

/// A minimal SOAP client for UPnP device communication
#[derive(Debug, Clone)]
pub struct SoapClient {
    agent: ureq::Agent,
}

impl SoapClient {
    /// Create a new SOAP client with default timeouts (5s connect, 10s read)
    pub fn new() -> Self {
        Self::with_timeouts(Duration::from_secs(5), Duration::from_secs(10))
    }

    /// Create a SOAP client with explicit connect and read timeouts
    pub fn with_timeouts(connect: Duration, read: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(connect)
                .timeout_read(read)
                .build(),
        }
    }

    /// Send a SOAP action and return the parsed `<ActionResponse>` element
    ///
    /// # Arguments
    /// * `host` - Device host or IP address
    /// * `port` - Device port (1400 for Sonos)
    /// * `endpoint` - Control endpoint path (e.g., "MediaRenderer/AVTransport/Control")
    /// * `service_uri` - Service URN used in the envelope and SOAPACTION header
    /// * `action` - Action name (e.g., "Play")
    /// * `payload` - Already-encoded argument elements, see [`encode_arguments`]
    pub fn call(
        &self,
        host: &str,
        port: u16,
        endpoint: &str,
        service_uri: &str,
        action: &str,
        payload: &str,
    ) -> Result<Element, SoapError> {
        let body = format!(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/"><s:Body><u:{action} xmlns:u="{service_uri}">{payload}</u:{action}></s:Body></s:Envelope>"#,
            action = action,
            service_uri = service_uri,
            payload = payload
        );

        let url = format!("http://{}:{}/{}", host, port, endpoint.trim_start_matches('/'));
        let soap_action = format!("\"{}#{}\"", service_uri, action);

        let response = match self
            .agent
            .post(&url)
            .set("Content-Type", "text/xml; charset=\"utf-8\"")
            .set("SOAPACTION", &soap_action)
            .send_string(&body)
        {
            Ok(response) => response,
            // UPnP devices report faults with HTTP 500 and a fault body
            Err(ureq::Error::Status(code, response)) => {
                let text = response
                    .into_string()
                    .map_err(|e| SoapError::Network(e.to_string()))?;
                return match Element::parse(text.as_bytes()) {
                    Ok(xml) => self.extract_response(&xml, action),
                    Err(_) => Err(SoapError::Network(format!("HTTP {}", code))),
                };
            }
            Err(e) => return Err(SoapError::Network(e.to_string())),
        };

        let xml_text = response
            .into_string()
            .map_err(|e| SoapError::Network(e.to_string()))?;

        let xml = Element::parse(xml_text.as_bytes())
            .map_err(|e| SoapError::Parse(e.to_string()))?;

        self.extract_response(&xml, action)
    }

    fn extract_response(&self, xml: &Element, action: &str) -> Result<Element, SoapError> {
        let body = xml
            .get_child("Body")
            .ok_or_else(|| SoapError::Parse("Missing SOAP Body".to_string()))?;

        if let Some(fault) = body.get_child("Fault") {
            let error_code = fault
                .get_child("detail")
                .and_then(|d| d.get_child("UPnPError"))
                .and_then(|e| e.get_child("errorCode"))
                .and_then(|c| c.get_text())
                .and_then(|t| t.trim().parse::<u16>().ok())
                .unwrap_or(500);
            return Err(SoapError::Fault(error_code));
        }

        let response_name = format!("{}Response", action);
        body.get_child(response_name.as_str())
            .cloned()
            .ok_or_else(|| SoapError::Parse(format!("Missing {} element", response_name)))
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode ordered action arguments as SOAP argument elements
///
/// Values are XML-escaped; names are written verbatim.
pub fn encode_arguments<'a, I>(arguments: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    arguments
        .into_iter()
        .map(|(name, value)| format!("<{name}>{}</{name}>", escape_xml(value)))
        .collect()
}

/// Read the output arguments of an action response element, in document order
///
/// Arguments with no text content are returned as empty strings.
pub fn output_arguments(response: &Element) -> Vec<(String, String)> {
    response
        .children
        .iter()
        .filter_map(|node| match node {
            XMLNode::Element(child) => Some((
                child.name.clone(),
                child.get_text().map(|t| t.into_owned()).unwrap_or_default(),
            )),
            _ => None,
        })
        .collect()
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soap_client_creation() {
        let _client = SoapClient::new();
        let _default_client = SoapClient::default();
        let _custom = SoapClient::with_timeouts(Duration::from_secs(1), Duration::from_secs(2));
    }

    #[test]
    fn test_encode_arguments_keeps_order_and_escapes() {
        let payload = encode_arguments([
            ("InstanceID", "0"),
            ("CurrentURI", "x-rincon:RINCON_1?a=1&b=<2>"),
        ]);
        assert_eq!(
            payload,
            "<InstanceID>0</InstanceID><CurrentURI>x-rincon:RINCON_1?a=1&amp;b=&lt;2&gt;</CurrentURI>"
        );
    }

    #[test]
    fn test_encode_arguments_empty() {
        assert_eq!(encode_arguments(std::iter::empty::<(&str, &str)>()), "");
    }

    #[test]
    fn test_output_arguments() {
        let xml_str = r#"
            <u:GetVolumeResponse xmlns:u="urn:schemas-upnp-org:service:RenderingControl:1">
                <CurrentVolume>42</CurrentVolume>
                <Extra></Extra>
            </u:GetVolumeResponse>
        "#;
        let xml = Element::parse(xml_str.as_bytes()).unwrap();

        let args = output_arguments(&xml);
        assert_eq!(
            args,
            vec![
                ("CurrentVolume".to_string(), "42".to_string()),
                ("Extra".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_extract_response_with_valid_response() {
        let client = SoapClient::new();

        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                    <u:PlayResponse xmlns:u="urn:schemas-upnp-org:service:AVTransport:1">
                    </u:PlayResponse>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        let response = client.extract_response(&xml, "Play").unwrap();
        assert_eq!(response.name, "PlayResponse");
    }

    #[test]
    fn test_extract_response_with_soap_fault() {
        let client = SoapClient::new();

        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                    <s:Fault>
                        <faultcode>s:Client</faultcode>
                        <faultstring>UPnPError</faultstring>
                        <detail>
                            <UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
                                <errorCode>701</errorCode>
                            </UPnPError>
                        </detail>
                    </s:Fault>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match client.extract_response(&xml, "Play") {
            Err(SoapError::Fault(code)) => assert_eq!(code, 701),
            other => panic!("Expected SoapError::Fault, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_response_missing_body() {
        let client = SoapClient::new();

        let xml_str = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"></s:Envelope>"#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match client.extract_response(&xml, "Play") {
            Err(SoapError::Parse(msg)) => assert!(msg.contains("Missing SOAP Body")),
            other => panic!("Expected SoapError::Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_response_missing_action_response() {
        let client = SoapClient::new();

        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match client.extract_response(&xml, "Pause") {
            Err(SoapError::Parse(msg)) => assert!(msg.contains("Missing PauseResponse element")),
            other => panic!("Expected SoapError::Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_soap_fault_with_default_error_code() {
        let client = SoapClient::new();

        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                    <s:Fault>
                        <faultcode>s:Server</faultcode>
                        <faultstring>Internal Error</faultstring>
                    </s:Fault>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match client.extract_response(&xml, "Play") {
            Err(SoapError::Fault(code)) => assert_eq!(code, 500),
            other => panic!("Expected SoapError::Fault, got {:?}", other),
        }
    }
}
