//! Lifecycle events emitted by a device.

use crate::error::DeviceError;

/// Events emitted by a [`Device`](crate::Device) to its subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// Initialization succeeded; attributes and services are available.
    Ready,

    /// Initialization failed. The device stays without attributes or services.
    Error(DeviceError),

    /// The expiration window was pushed out by `refresh()`.
    Refreshed,

    /// The expiration window elapsed without a refresh.
    Expired,
}

/// Payload-free discriminant of a [`DeviceEvent`], for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    Error,
    Refreshed,
    Expired,
}

impl DeviceEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DeviceEvent::Ready => EventKind::Ready,
            DeviceEvent::Error(_) => EventKind::Error,
            DeviceEvent::Refreshed => EventKind::Refreshed,
            DeviceEvent::Expired => EventKind::Expired,
        }
    }
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Ready => "ready",
            EventKind::Error => "error",
            EventKind::Refreshed => "refreshed",
            EventKind::Expired => "expired",
        }
    }
}
