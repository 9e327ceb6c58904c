//! Typed command definitions for the device command surface
//!
//! Every command is a plain request struct whose `Default` carries the
//! documented parameter defaults. Implementing [`Command`] turns it into an
//! [`Action`] with a flat parameter bag keyed by the exact remote argument
//! names. Callers that want to override a single parameter build the struct
//! with `..Default::default()` and hand it to [`Device::send`](crate::Device::send).

use std::fmt;
use std::str::FromStr;

use crate::action::{Action, ActionParams, ParamValue};
use crate::error::DeviceError;
use crate::service::Service;

/// A request that maps onto a single remote action
pub trait Command {
    /// The UPnP service this command belongs to
    const SERVICE: Service;

    /// The remote action name
    const ACTION: &'static str;

    /// Assemble the parameter bag, in the order the service declares it
    fn into_params(self) -> ActionParams;

    fn into_action(self) -> Action
    where
        Self: Sized,
    {
        Action::new(Self::SERVICE, Self::ACTION, self.into_params())
    }
}

/// Declare a command struct, its defaults and its [`Command`] implementation
///
/// # Example
/// ```rust,ignore
/// define_command! {
///     /// Set the rendering volume
///     command: SetVolume,
///     action: "SetVolume",
///     service: RenderingControl,
///     params: {
///         instance_id: u32 = 0 => "InstanceID",
///         channel: String = "Master".to_string() => "Channel",
///         desired_volume: u8 = 30 => "DesiredVolume",
///     },
/// }
/// ```
macro_rules! define_command {
    (
        $(#[$meta:meta])*
        command: $name:ident,
        action: $action:literal,
        service: $service:ident,
        params: {
            $($(#[$field_meta:meta])* $field:ident: $field_type:ty = $default:expr => $remote:literal),* $(,)?
        } $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $($(#[$field_meta])* pub $field: $field_type,)*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $($field: $default,)*
                }
            }
        }

        impl $crate::command::Command for $name {
            const SERVICE: $crate::service::Service = $crate::service::Service::$service;
            const ACTION: &'static str = $action;

            fn into_params(self) -> $crate::action::ActionParams {
                #[allow(unused_mut)]
                let mut params = $crate::action::ActionParams::new();
                $(params.push($remote, self.$field);)*
                params
            }
        }
    };
}

pub(crate) use define_command;

/// AVTransport play modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PlayMode {
    #[default]
    Normal,
    RepeatAll,
    RepeatOne,
    ShuffleNoRepeat,
    Shuffle,
    ShuffleRepeatOne,
}

impl PlayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayMode::Normal => "NORMAL",
            PlayMode::RepeatAll => "REPEAT_ALL",
            PlayMode::RepeatOne => "REPEAT_ONE",
            PlayMode::ShuffleNoRepeat => "SHUFFLE_NOREPEAT",
            PlayMode::Shuffle => "SHUFFLE",
            PlayMode::ShuffleRepeatOne => "SHUFFLE_REPEAT_ONE",
        }
    }
}

impl fmt::Display for PlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayMode {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NORMAL" => Ok(PlayMode::Normal),
            "REPEAT_ALL" => Ok(PlayMode::RepeatAll),
            "REPEAT_ONE" => Ok(PlayMode::RepeatOne),
            "SHUFFLE_NOREPEAT" => Ok(PlayMode::ShuffleNoRepeat),
            "SHUFFLE" => Ok(PlayMode::Shuffle),
            "SHUFFLE_REPEAT_ONE" => Ok(PlayMode::ShuffleRepeatOne),
            other => Err(DeviceError::ParseError(format!("Unknown play mode '{}'", other))),
        }
    }
}

impl From<PlayMode> for ParamValue {
    fn from(mode: PlayMode) -> Self {
        ParamValue::Text(mode.as_str().to_string())
    }
}

// RenderingControl

define_command! {
    /// Read the current volume of a channel
    command: GetVolume,
    action: "GetVolume",
    service: RenderingControl,
    params: {
        instance_id: u32 = 0 => "InstanceID",
        channel: String = "Master".to_string() => "Channel",
    },
}

define_command! {
    /// Set the volume of a channel
    command: SetVolume,
    action: "SetVolume",
    service: RenderingControl,
    params: {
        instance_id: u32 = 0 => "InstanceID",
        channel: String = "Master".to_string() => "Channel",
        desired_volume: u8 = 30 => "DesiredVolume",
    },
}

define_command! {
    command: GetMute,
    action: "GetMute",
    service: RenderingControl,
    params: {
        instance_id: u32 = 0 => "InstanceID",
        channel: String = "Master".to_string() => "Channel",
    },
}

define_command! {
    command: SetMute,
    action: "SetMute",
    service: RenderingControl,
    params: {
        instance_id: u32 = 0 => "InstanceID",
        channel: String = "Master".to_string() => "Channel",
        desired_mute: bool = true => "DesiredMute",
    },
}

// AVTransport

define_command! {
    command: GetMediaInfo,
    action: "GetMediaInfo",
    service: AVTransport,
    params: {
        instance_id: u32 = 0 => "InstanceID",
    },
}

define_command! {
    command: GetTransportInfo,
    action: "GetTransportInfo",
    service: AVTransport,
    params: {
        instance_id: u32 = 0 => "InstanceID",
    },
}

define_command! {
    command: GetPositionInfo,
    action: "GetPositionInfo",
    service: AVTransport,
    params: {
        instance_id: u32 = 0 => "InstanceID",
    },
}

define_command! {
    command: GetDeviceCapabilities,
    action: "GetDeviceCapabilities",
    service: AVTransport,
    params: {
        instance_id: u32 = 0 => "InstanceID",
    },
}

define_command! {
    command: GetTransportSettings,
    action: "GetTransportSettings",
    service: AVTransport,
    params: {
        instance_id: u32 = 0 => "InstanceID",
    },
}

define_command! {
    command: GetCrossfadeMode,
    action: "GetCrossfadeMode",
    service: AVTransport,
    params: {
        instance_id: u32 = 0 => "InstanceID",
    },
}

define_command! {
    /// Enable or disable crossfading between tracks
    command: SetCrossfadeMode,
    action: "SetCrossfadeMode",
    service: AVTransport,
    params: {
        instance_id: u32 = 0 => "InstanceID",
        crossfade_mode: bool = false => "CrossfadeMode",
    },
}

define_command! {
    command: SetPlayMode,
    action: "SetPlayMode",
    service: AVTransport,
    params: {
        instance_id: u32 = 0 => "InstanceID",
        new_play_mode: PlayMode = PlayMode::Normal => "NewPlayMode",
    },
}

define_command! {
    /// Start or resume playback
    command: Play,
    action: "Play",
    service: AVTransport,
    params: {
        instance_id: u32 = 0 => "InstanceID",
        /// Playback speed, 1 is the only value Sonos accepts
        speed: u32 = 1 => "Speed",
    },
}

define_command! {
    command: Stop,
    action: "Stop",
    service: AVTransport,
    params: {
        instance_id: u32 = 0 => "InstanceID",
    },
}

define_command! {
    command: Pause,
    action: "Pause",
    service: AVTransport,
    params: {
        instance_id: u32 = 0 => "InstanceID",
    },
}

define_command! {
    command: Next,
    action: "Next",
    service: AVTransport,
    params: {
        instance_id: u32 = 0 => "InstanceID",
    },
}

define_command! {
    command: Previous,
    action: "Previous",
    service: AVTransport,
    params: {
        instance_id: u32 = 0 => "InstanceID",
    },
}

define_command! {
    command: GetCurrentTransportActions,
    action: "GetCurrentTransportActions",
    service: AVTransport,
    params: {
        instance_id: u32 = 0 => "InstanceID",
    },
}
