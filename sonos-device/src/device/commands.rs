//! Command surface of a [`Device`].
//!
//! Each method builds the matching request struct from
//! [`crate::command`] and returns the dispatcher's result untouched.

use tracing::warn;

use super::Device;
use crate::action::{Action, ActionResponse};
use crate::command::*;
use crate::error::{DeviceError, Result};
use crate::services::{DeviceProperties, LedState};

impl Device {
    /// Send any typed command
    ///
    /// ```rust,ignore
    /// device.send(SetVolume { desired_volume: 12, ..Default::default() }).await?;
    /// ```
    pub async fn send<C: Command>(&self, command: C) -> Result<ActionResponse> {
        self.invoke(command.into_action()).await
    }

    /// Send a raw action
    pub async fn invoke(&self, action: Action) -> Result<ActionResponse> {
        self.inner.invoker.invoke(action).await
    }

    pub async fn get_volume(&self) -> Result<ActionResponse> {
        self.send(GetVolume::default()).await
    }

    pub async fn set_volume(&self, volume: u8) -> Result<ActionResponse> {
        self.send(SetVolume {
            desired_volume: volume,
            ..Default::default()
        })
        .await
    }

    pub async fn get_mute(&self) -> Result<ActionResponse> {
        self.send(GetMute::default()).await
    }

    pub async fn set_mute(&self, mute: bool) -> Result<ActionResponse> {
        self.send(SetMute {
            desired_mute: mute,
            ..Default::default()
        })
        .await
    }

    pub async fn get_media_info(&self) -> Result<ActionResponse> {
        self.send(GetMediaInfo::default()).await
    }

    pub async fn get_transport_info(&self) -> Result<ActionResponse> {
        self.send(GetTransportInfo::default()).await
    }

    pub async fn get_position_info(&self) -> Result<ActionResponse> {
        self.send(GetPositionInfo::default()).await
    }

    pub async fn get_device_capabilities(&self) -> Result<ActionResponse> {
        self.send(GetDeviceCapabilities::default()).await
    }

    pub async fn get_transport_settings(&self) -> Result<ActionResponse> {
        self.send(GetTransportSettings::default()).await
    }

    pub async fn get_crossfade_mode(&self) -> Result<ActionResponse> {
        self.send(GetCrossfadeMode::default()).await
    }

    pub async fn set_crossfade_mode(&self, enabled: bool) -> Result<ActionResponse> {
        self.send(SetCrossfadeMode {
            crossfade_mode: enabled,
            ..Default::default()
        })
        .await
    }

    pub async fn set_play_mode(&self, mode: PlayMode) -> Result<ActionResponse> {
        self.send(SetPlayMode {
            new_play_mode: mode,
            ..Default::default()
        })
        .await
    }

    pub async fn play(&self) -> Result<ActionResponse> {
        self.send(Play::default()).await
    }

    pub async fn stop(&self) -> Result<ActionResponse> {
        self.send(Stop::default()).await
    }

    pub async fn pause(&self) -> Result<ActionResponse> {
        self.send(Pause::default()).await
    }

    pub async fn next(&self) -> Result<ActionResponse> {
        self.send(Next::default()).await
    }

    pub async fn previous(&self) -> Result<ActionResponse> {
        self.send(Previous::default()).await
    }

    pub async fn get_current_transport_actions(&self) -> Result<ActionResponse> {
        self.send(GetCurrentTransportActions::default()).await
    }

    /// Not supported; always fails with `NotImplemented`
    pub async fn seek(&self, target: &str) -> Result<ActionResponse> {
        warn!(address = %self.address(), target, "Seek is not implemented");
        Err(DeviceError::NotImplemented("Seek"))
    }

    pub async fn set_led_state(&self, state: LedState) -> Result<ActionResponse> {
        self.device_properties()?.set_led_state(state).await
    }

    pub async fn get_led_state(&self) -> Result<ActionResponse> {
        self.device_properties()?.get_led_state().await
    }

    fn device_properties(&self) -> Result<&DeviceProperties> {
        self.services()
            .map(|services| &services.device_properties)
            .ok_or_else(|| {
                DeviceError::NotReady(format!(
                    "device properties of {} are available after init",
                    self.address()
                ))
            })
    }
}
