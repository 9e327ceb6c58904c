//! Configuration for a device and its default collaborators.

use std::time::Duration;

use crate::error::{DeviceError, Result};
use crate::expiry::MAX_EXPIRY;

/// Configuration for a [`Device`](crate::Device)
///
/// Controls the expiry window, how the default SOAP dispatcher and
/// description fetcher reach the device, and how many lifecycle events a slow
/// subscriber may lag behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Expiry window armed on `init` and by `refresh()`
    /// Default: 1800 seconds (30 minutes)
    pub expiry_interval: Duration,

    /// Port the device serves UPnP control requests on
    /// Default: 1400
    pub soap_port: u16,

    /// Connect timeout for SOAP requests
    /// Default: 5 seconds
    pub connect_timeout: Duration,

    /// Read timeout for SOAP requests
    /// Default: 10 seconds
    pub read_timeout: Duration,

    /// Overall timeout for the description request
    /// Default: 10 seconds
    pub description_timeout: Duration,

    /// Capacity of the lifecycle event channel
    /// Default: 64
    pub event_buffer_size: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            expiry_interval: Duration::from_secs(1800),
            soap_port: 1400,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            description_timeout: Duration::from_secs(10),
            event_buffer_size: 64,
        }
    }
}

impl DeviceConfig {
    /// Create a new DeviceConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return the first issue found
    pub fn validate(&self) -> Result<()> {
        if self.expiry_interval == Duration::ZERO {
            return Err(DeviceError::ConfigurationError(
                "Expiry interval must be greater than 0".to_string(),
            ));
        }

        if self.expiry_interval > MAX_EXPIRY {
            return Err(DeviceError::ConfigurationError(format!(
                "Expiry interval must be at most {} seconds",
                MAX_EXPIRY.as_secs()
            )));
        }

        if self.soap_port == 0 {
            return Err(DeviceError::ConfigurationError(
                "SOAP port must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(DeviceError::ConfigurationError(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.description_timeout == Duration::ZERO {
            return Err(DeviceError::ConfigurationError(
                "Description timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_expiry_interval(mut self, interval: Duration) -> Self {
        self.expiry_interval = interval;
        self
    }

    pub fn with_soap_port(mut self, port: u16) -> Self {
        self.soap_port = port;
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    pub fn with_description_timeout(mut self, timeout: Duration) -> Self {
        self.description_timeout = timeout;
        self
    }

    pub fn with_event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DeviceConfig::default();
        assert_eq!(config.expiry_interval, Duration::from_secs(1800));
        assert_eq!(config.soap_port, 1400);
        assert_eq!(config.event_buffer_size, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = DeviceConfig::new()
            .with_expiry_interval(Duration::from_secs(60))
            .with_soap_port(8080)
            .with_timeouts(Duration::from_secs(1), Duration::from_secs(2))
            .with_description_timeout(Duration::from_secs(3))
            .with_event_buffer_size(8);

        assert_eq!(config.expiry_interval, Duration::from_secs(60));
        assert_eq!(config.soap_port, 8080);
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.read_timeout, Duration::from_secs(2));
        assert_eq!(config.description_timeout, Duration::from_secs(3));
        assert_eq!(config.event_buffer_size, 8);
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        let config = DeviceConfig::new().with_expiry_interval(Duration::ZERO);
        assert!(matches!(config.validate(), Err(DeviceError::ConfigurationError(_))));

        let config = DeviceConfig::new().with_soap_port(0);
        assert!(config.validate().is_err());

        let config = DeviceConfig::new().with_event_buffer_size(0);
        assert!(config.validate().is_err());

        let config = DeviceConfig::new().with_description_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_unbounded_expiry() {
        let config = DeviceConfig::new().with_expiry_interval(Duration::MAX);
        assert!(matches!(config.validate(), Err(DeviceError::ConfigurationError(_))));

        let config = DeviceConfig::new().with_expiry_interval(MAX_EXPIRY);
        assert!(config.validate().is_ok());
    }
}
