use serde::{Deserialize, Serialize};

use crate::alarm::AlarmChannel;

/// Every observable state change produces an Event.
/// The renderer turns these into visuals, sounds and messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ClaimToggled {
        number: u8,
        claimed: bool,
        count: usize,
    },
    ClaimsCleared,
    /// Count reached 100. The renderer plays the celebration and reports
    /// back through `Tracker::finish_celebration`.
    CelebrationStarted,
    /// The top-of-hour edge was consumed for this hour.
    HourRolledOver {
        links_cleared: bool,
    },
    FilterChanged {
        only_unclaimed: bool,
    },
    AutoClearChanged {
        enabled: bool,
    },
    TemplateChanged {
        template: String,
    },
    LinkSet {
        number: u8,
        url: String,
    },
    LinkCleared {
        number: u8,
    },
    LinksCleared,
    Imported {
        claimed: usize,
        links: usize,
    },
    AlarmArmed {
        minutes: u32,
    },
    AlarmCleared,
    IndicatorToggled {
        channel: AlarmChannel,
        enabled: bool,
    },
    /// Countdown crossed below the alarm threshold.
    AlarmTriggered {
        minutes: u32,
        ms_until_next_hour: u64,
    },
    /// Countdown went back above the threshold; the alarm can fire again.
    AlarmRearmed,
    OverlayShown,
    OverlayDismissed,
    SoundRequested,
    /// A system notification is due (permission already granted).
    Notify {
        title: String,
    },
    /// Short transient message for the user.
    Advisory {
        message: String,
    },
}

impl Event {
    pub fn advisory(message: impl Into<String>) -> Self {
        Event::Advisory {
            message: message.into(),
        }
    }
}
