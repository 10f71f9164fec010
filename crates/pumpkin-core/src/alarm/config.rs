use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Minute choices offered by the alarm picker.
pub const ALARM_PRESETS: [u32; 3] = [5, 10, 15];

/// Indicator channels the alarm can fire on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmChannel {
    Visual,
    Audible,
    Alert,
}

impl AlarmChannel {
    pub const ALL: [AlarmChannel; 3] = [AlarmChannel::Visual, AlarmChannel::Audible, AlarmChannel::Alert];

    pub fn as_str(self) -> &'static str {
        match self {
            AlarmChannel::Visual => "visual",
            AlarmChannel::Audible => "audible",
            AlarmChannel::Alert => "alert",
        }
    }
}

impl fmt::Display for AlarmChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlarmChannel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visual" => Ok(AlarmChannel::Visual),
            "audible" => Ok(AlarmChannel::Audible),
            "alert" => Ok(AlarmChannel::Alert),
            other => Err(ValidationError::InvalidValue {
                field: "alarm channel".into(),
                message: format!("'{other}' is not one of visual, audible, alert"),
            }),
        }
    }
}

/// State of the system notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    /// No notification support at all.
    Unsupported,
    /// Not asked yet.
    #[default]
    Default,
    Granted,
    Denied,
}

impl NotificationPermission {
    pub fn is_supported(self) -> bool {
        self != NotificationPermission::Unsupported
    }
}

impl FromStr for NotificationPermission {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unsupported" => Ok(Self::Unsupported),
            "default" => Ok(Self::Default),
            "granted" => Ok(Self::Granted),
            "denied" => Ok(Self::Denied),
            other => Err(ValidationError::InvalidValue {
                field: "notification permission".into(),
                message: format!("'{other}' is not one of unsupported, default, granted, denied"),
            }),
        }
    }
}

/// Wave-end alarm settings.
///
/// `triggered` is runtime-only: it is never written to storage, so a fresh
/// process starts with the latch open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    pub active: bool,
    pub minutes: u32,
    pub visual: bool,
    pub audible: bool,
    pub alert: bool,
    #[serde(skip)]
    pub triggered: bool,
}

impl AlarmConfig {
    pub fn channel(&self, channel: AlarmChannel) -> bool {
        match channel {
            AlarmChannel::Visual => self.visual,
            AlarmChannel::Audible => self.audible,
            AlarmChannel::Alert => self.alert,
        }
    }

    pub(crate) fn channel_mut(&mut self, channel: AlarmChannel) -> &mut bool {
        match channel {
            AlarmChannel::Visual => &mut self.visual,
            AlarmChannel::Audible => &mut self.audible,
            AlarmChannel::Alert => &mut self.alert,
        }
    }
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            active: false,
            minutes: ALARM_PRESETS[0],
            visual: true,
            audible: true,
            alert: true,
            triggered: false,
        }
    }
}
