//! Wave-end alarm.
//!
//! The alarm warns a configured number of minutes before the top of the
//! hour. It is a plain state machine driven by `evaluate()`, called with
//! the countdown on every poll:
//!
//! ```text
//! Disarmed --arm--> Armed{triggered=false}
//! Armed{false} --ms <= threshold--> Armed{true}   (channels fire once)
//! Armed{true}  --ms >  threshold--> Armed{false}  (after the hour rolls)
//! Armed{_} --clear--> Disarmed
//! ```
//!
//! Side effects are returned as [`Event`]s; the machine never talks to a
//! notification service, speaker or screen itself.

mod config;

pub use config::{AlarmChannel, AlarmConfig, NotificationPermission, ALARM_PRESETS};

use crate::error::ValidationError;
use crate::events::Event;

pub const NOTIFICATION_TITLE: &str = "It's time to check for Placekins!";

/// Alarm configuration plus the overlay it may be showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlarmMachine {
    config: AlarmConfig,
    overlay_active: bool,
}

impl AlarmMachine {
    pub fn new(config: AlarmConfig) -> Self {
        Self {
            config: AlarmConfig {
                triggered: false,
                ..config
            },
            overlay_active: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &AlarmConfig {
        &self.config
    }

    pub fn is_armed(&self) -> bool {
        self.config.active
    }

    pub fn is_triggered(&self) -> bool {
        self.config.triggered
    }

    pub fn overlay_active(&self) -> bool {
        self.overlay_active
    }

    /// Remaining-time threshold in milliseconds.
    pub fn threshold_ms(&self) -> u64 {
        u64::from(self.config.minutes) * 60_000
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm for `minutes` before the hour. Re-arming resets the latch.
    pub fn arm(&mut self, minutes: u32) -> Result<Vec<Event>, ValidationError> {
        if minutes == 0 {
            return Err(ValidationError::OutOfRange {
                field: "alarm minutes".into(),
                value: 0,
                min: 1,
                max: i64::from(u32::MAX),
            });
        }
        self.config.minutes = minutes;
        self.config.active = true;
        self.config.triggered = false;
        let mut events = self.dismiss_overlay();
        events.push(Event::AlarmArmed { minutes });
        Ok(events)
    }

    pub fn clear(&mut self) -> Vec<Event> {
        self.config.active = false;
        self.config.triggered = false;
        let mut events = self.dismiss_overlay();
        events.push(Event::AlarmCleared);
        events
    }

    /// Flip one indicator channel. Arm state is untouched.
    pub fn toggle_indicator(&mut self, channel: AlarmChannel) -> Vec<Event> {
        let enabled = {
            let slot = self.config.channel_mut(channel);
            *slot = !*slot;
            *slot
        };
        let mut events = vec![Event::IndicatorToggled { channel, enabled }];
        if channel == AlarmChannel::Visual && !enabled {
            events.extend(self.dismiss_overlay());
        }
        events
    }

    /// Take settings written by another process. The trigger latch survives
    /// only while the alarm stays armed at the same threshold.
    pub fn adopt(&mut self, config: AlarmConfig) -> Vec<Event> {
        let keep_latch = self.config.triggered
            && self.config.active
            && config.active
            && config.minutes == self.config.minutes;
        self.config = AlarmConfig {
            triggered: keep_latch,
            ..config
        };
        if !config.active || !config.visual {
            self.dismiss_overlay()
        } else {
            Vec::new()
        }
    }

    /// Any key press or pointer press while the overlay shows dismisses it.
    pub fn user_interaction(&mut self) -> Vec<Event> {
        self.dismiss_overlay()
    }

    /// Feed the current countdown.
    pub fn evaluate(
        &mut self,
        ms_until_next_hour: u64,
        permission: NotificationPermission,
    ) -> Vec<Event> {
        if !self.config.active {
            return self.dismiss_overlay();
        }

        let threshold = self.threshold_ms();
        if ms_until_next_hour <= threshold && !self.config.triggered {
            self.config.triggered = true;
            let mut events = vec![Event::AlarmTriggered {
                minutes: self.config.minutes,
                ms_until_next_hour,
            }];
            if self.config.visual {
                self.overlay_active = true;
                events.push(Event::OverlayShown);
            }
            if self.config.audible {
                events.push(Event::SoundRequested);
            }
            if self.config.alert {
                events.extend(alert_event(permission));
            }
            tracing::info!(minutes = self.config.minutes, ms_until_next_hour, "wave alarm fired");
            events
        } else if ms_until_next_hour > threshold && self.config.triggered {
            self.config.triggered = false;
            let mut events = vec![Event::AlarmRearmed];
            events.extend(self.dismiss_overlay());
            events
        } else {
            Vec::new()
        }
    }

    fn dismiss_overlay(&mut self) -> Vec<Event> {
        if self.overlay_active {
            self.overlay_active = false;
            vec![Event::OverlayDismissed]
        } else {
            Vec::new()
        }
    }
}

/// What the alert channel does under each permission state.
fn alert_event(permission: NotificationPermission) -> Option<Event> {
    match permission {
        NotificationPermission::Unsupported => Some(Event::advisory(
            "Desktop notifications are not supported in this environment",
        )),
        NotificationPermission::Denied => Some(Event::advisory("Desktop notifications are blocked")),
        NotificationPermission::Granted => Some(Event::Notify {
            title: NOTIFICATION_TITLE.to_string(),
        }),
        NotificationPermission::Default => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRANTED: NotificationPermission = NotificationPermission::Granted;

    fn armed(minutes: u32) -> AlarmMachine {
        let mut alarm = AlarmMachine::default();
        alarm.arm(minutes).unwrap();
        alarm
    }

    #[test]
    fn zero_minutes_is_rejected() {
        let mut alarm = AlarmMachine::default();
        assert!(alarm.arm(0).is_err());
        assert!(!alarm.is_armed());
    }

    #[test]
    fn fires_once_on_downward_crossing() {
        let mut alarm = armed(5);
        assert!(alarm.evaluate(300_001, GRANTED).is_empty());
        let events = alarm.evaluate(300_000, GRANTED);
        assert!(alarm.is_triggered());
        assert_eq!(
            events,
            vec![
                Event::AlarmTriggered { minutes: 5, ms_until_next_hour: 300_000 },
                Event::OverlayShown,
                Event::SoundRequested,
                Event::Notify { title: NOTIFICATION_TITLE.into() },
            ]
        );
        for ms in (0..300_000).rev().step_by(250) {
            assert!(alarm.evaluate(ms, GRANTED).is_empty());
        }
    }

    #[test]
    fn rearms_after_rollover() {
        let mut alarm = armed(5);
        alarm.evaluate(120_000, GRANTED);
        assert!(alarm.overlay_active());

        let events = alarm.evaluate(3_600_000, GRANTED);
        assert_eq!(events, vec![Event::AlarmRearmed, Event::OverlayDismissed]);
        assert!(!alarm.is_triggered());
        assert!(alarm.is_armed());
        assert!(alarm.evaluate(3_599_750, GRANTED).is_empty());

        assert!(!alarm.evaluate(299_900, GRANTED).is_empty());
        assert!(alarm.is_triggered());
    }

    #[test]
    fn arming_inside_the_window_fires_on_next_evaluation() {
        let mut alarm = armed(15);
        let events = alarm.evaluate(60_000, GRANTED);
        assert!(matches!(events[0], Event::AlarmTriggered { .. }));
    }

    #[test]
    fn disabled_channels_stay_quiet() {
        let mut alarm = armed(5);
        alarm.toggle_indicator(AlarmChannel::Audible);
        alarm.toggle_indicator(AlarmChannel::Alert);
        let events = alarm.evaluate(1_000, GRANTED);
        assert_eq!(
            events,
            vec![
                Event::AlarmTriggered { minutes: 5, ms_until_next_hour: 1_000 },
                Event::OverlayShown,
            ]
        );
    }

    #[test]
    fn alert_depends_on_permission() {
        let mut alarm = armed(5);
        let events = alarm.evaluate(1_000, NotificationPermission::Denied);
        assert_eq!(
            events.last(),
            Some(&Event::advisory("Desktop notifications are blocked"))
        );

        let mut alarm = armed(5);
        let events = alarm.evaluate(1_000, NotificationPermission::Unsupported);
        assert!(matches!(events.last(), Some(Event::Advisory { .. })));

        let mut alarm = armed(5);
        let events = alarm.evaluate(1_000, NotificationPermission::Default);
        assert_eq!(events.last(), Some(&Event::SoundRequested));
    }

    #[test]
    fn turning_visual_off_dismisses_overlay() {
        let mut alarm = armed(5);
        alarm.evaluate(1_000, GRANTED);
        assert!(alarm.overlay_active());
        let events = alarm.toggle_indicator(AlarmChannel::Visual);
        assert_eq!(
            events,
            vec![
                Event::IndicatorToggled { channel: AlarmChannel::Visual, enabled: false },
                Event::OverlayDismissed,
            ]
        );
        assert!(!alarm.overlay_active());
    }

    #[test]
    fn interaction_dismisses_overlay_once() {
        let mut alarm = armed(5);
        alarm.evaluate(1_000, GRANTED);
        assert_eq!(alarm.user_interaction(), vec![Event::OverlayDismissed]);
        assert!(alarm.user_interaction().is_empty());
        // still triggered: dismissing does not re-fire
        assert!(alarm.evaluate(500, GRANTED).is_empty());
    }

    #[test]
    fn clear_disarms_and_dismisses() {
        let mut alarm = armed(5);
        alarm.evaluate(1_000, GRANTED);
        let events = alarm.clear();
        assert_eq!(events, vec![Event::OverlayDismissed, Event::AlarmCleared]);
        assert!(!alarm.is_armed());
        assert!(!alarm.is_triggered());
        assert!(alarm.evaluate(500, GRANTED).is_empty());
    }

    #[test]
    fn rearming_resets_the_latch() {
        let mut alarm = armed(5);
        alarm.evaluate(1_000, GRANTED);
        alarm.arm(10).unwrap();
        assert!(!alarm.is_triggered());
        assert!(!alarm.overlay_active());
        assert!(!alarm.evaluate(500, GRANTED).is_empty());
    }

    #[test]
    fn new_never_restores_a_triggered_latch() {
        let config = AlarmConfig {
            active: true,
            triggered: true,
            ..AlarmConfig::default()
        };
        assert!(!AlarmMachine::new(config).is_triggered());
    }

    #[test]
    fn adopting_a_cleared_config_stops_the_alarm() {
        let mut alarm = armed(5);
        alarm.evaluate(200_000, GRANTED);
        assert!(alarm.overlay_active());

        let cleared = AlarmConfig {
            active: false,
            ..*alarm.config()
        };
        assert_eq!(alarm.adopt(cleared), vec![Event::OverlayDismissed]);
        assert!(!alarm.is_armed());
        assert!(alarm.evaluate(100_000, GRANTED).is_empty());
    }

    #[test]
    fn adopting_unchanged_settings_keeps_the_latch() {
        let mut alarm = armed(5);
        alarm.evaluate(200_000, GRANTED);
        let same = *alarm.config();
        assert!(alarm.adopt(same).is_empty());
        assert!(alarm.is_triggered());
        assert!(alarm.overlay_active());
        assert!(alarm.evaluate(150_000, GRANTED).is_empty());
    }

    #[test]
    fn adopting_visual_off_dismisses_the_overlay() {
        let mut alarm = armed(5);
        alarm.evaluate(200_000, GRANTED);
        let quiet = AlarmConfig {
            visual: false,
            ..*alarm.config()
        };
        assert_eq!(alarm.adopt(quiet), vec![Event::OverlayDismissed]);
        assert!(alarm.is_triggered());
    }
}
