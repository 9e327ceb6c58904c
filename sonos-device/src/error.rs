//! Error types for the sonos-device crate.

use soap_client::SoapError;
use thiserror::Error;

use crate::device::DeviceState;

/// Errors surfaced by a device, its collaborators and its command surface.
///
/// The enum is `Clone` so that an initialization failure can be delivered to
/// every subscriber through [`DeviceEvent::Error`](crate::DeviceEvent::Error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// Network communication error
    ///
    /// Connection refused, timeouts, DNS failures or an unreachable device,
    /// while fetching the description or invoking an action.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response parsing error
    ///
    /// The device answered but the description or action response could not
    /// be read.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// SOAP fault returned by the device
    #[error("SOAP fault: error code {0}")]
    SoapFault(u16),

    /// The operation needs state that only exists once the device is ready
    #[error("Device not ready: {0}")]
    NotReady(String),

    /// Lifecycle operation attempted from a state that does not allow it
    #[error("Cannot {operation} while device is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: DeviceState,
    },

    /// Declared command with no implementation
    #[error("Action not implemented: {0}")]
    NotImplemented(&'static str),

    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// No tokio runtime was available to schedule work, or a task failed
    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

/// Type alias for results that can return a DeviceError
pub type Result<T> = std::result::Result<T, DeviceError>;

impl From<SoapError> for DeviceError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Network(msg) => DeviceError::NetworkError(msg),
            SoapError::Parse(msg) => DeviceError::ParseError(msg),
            SoapError::Fault(code) => DeviceError::SoapFault(code),
        }
    }
}
