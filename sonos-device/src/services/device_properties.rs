//! DeviceProperties sub-service: device-level settings such as the status LED.

use std::fmt;
use std::str::FromStr;

use crate::action::{ActionResponse, ParamValue};
use crate::command::{define_command, Command};
use crate::dispatcher::ActionInvoker;
use crate::error::{DeviceError, Result};

/// State of the status LED on the front of the speaker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LedState {
    #[default]
    On,
    Off,
}

impl LedState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedState::On => "On",
            LedState::Off => "Off",
        }
    }
}

impl fmt::Display for LedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedState {
    type Err = DeviceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "On" => Ok(LedState::On),
            "Off" => Ok(LedState::Off),
            other => Err(DeviceError::ParseError(format!("Unknown LED state '{}'", other))),
        }
    }
}

impl From<LedState> for ParamValue {
    fn from(state: LedState) -> Self {
        ParamValue::Text(state.as_str().to_string())
    }
}

define_command! {
    command: SetLedState,
    action: "SetLEDState",
    service: DeviceProperties,
    params: {
        desired_led_state: LedState = LedState::On => "DesiredLEDState",
    },
}

define_command! {
    command: GetLedState,
    action: "GetLEDState",
    service: DeviceProperties,
    params: {},
}

define_command! {
    command: GetZoneAttributes,
    action: "GetZoneAttributes",
    service: DeviceProperties,
    params: {},
}

define_command! {
    command: GetZoneInfo,
    action: "GetZoneInfo",
    service: DeviceProperties,
    params: {},
}

/// Device-level settings of one speaker
#[derive(Debug, Clone)]
pub struct DeviceProperties {
    invoker: ActionInvoker,
}

impl DeviceProperties {
    pub(crate) fn new(invoker: ActionInvoker) -> Self {
        Self { invoker }
    }

    pub async fn set_led_state(&self, state: LedState) -> Result<ActionResponse> {
        let command = SetLedState {
            desired_led_state: state,
        };
        self.invoker.invoke(command.into_action()).await
    }

    /// Returns the raw response; `CurrentLEDState` holds "On" or "Off"
    pub async fn get_led_state(&self) -> Result<ActionResponse> {
        self.invoker.invoke(GetLedState::default().into_action()).await
    }

    pub async fn get_zone_attributes(&self) -> Result<ActionResponse> {
        self.invoker
            .invoke(GetZoneAttributes::default().into_action())
            .await
    }

    pub async fn get_zone_info(&self) -> Result<ActionResponse> {
        self.invoker.invoke(GetZoneInfo::default().into_action()).await
    }
}
