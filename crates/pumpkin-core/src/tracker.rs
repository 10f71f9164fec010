//! The tracker: one owner for all user state.
//!
//! Built from storage at startup, then handed by reference to whatever
//! renders it. Every mutating call writes the touched field back through
//! the [`Persistence`] gateway before returning, and reports what happened
//! as [`Event`]s.
//!
//! ## Usage
//!
//! ```ignore
//! let mut tracker = Tracker::load(Database::open()?);
//! tracker.toggle(PumpkinNumber::new(42)?, true);
//! // In the polling loop:
//! let events = tracker.tick(Countdown::from_clock(&SystemClock), &mut notifier);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::alarm::{AlarmChannel, AlarmConfig, AlarmMachine, NotificationPermission};
use crate::claims::{CelebrationLatch, ClaimedSet, PumpkinNumber, TOTAL};
use crate::clock::{Countdown, EdgeLatch, MS_PER_HOUR};
use crate::codec::{self, PersistedState};
use crate::collaborators::{Clipboard, FileDownload, NotificationService, Prompt};
use crate::error::{CoreError, Result, StorageError};
use crate::events::Event;
use crate::links::{LinkTable, MapTemplate};
use crate::storage::database::DB_FILE;
use crate::storage::{data_dir, Config, Database, KvStore, Persistence};

pub const CLEAR_CONFIRMATION: &str = "Uncheck all pumpkins?";

/// Where an export ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "destination", rename_all = "snake_case")]
pub enum ExportOutcome {
    Clipboard,
    File { path: PathBuf },
}

/// Everything a renderer needs to draw the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerView {
    pub claimed: Vec<u8>,
    pub claimed_count: usize,
    pub total: usize,
    pub visible: Vec<u8>,
    pub countdown: String,
    pub ms_until_next_hour: u64,
    pub filter_only_unclaimed: bool,
    pub auto_clear_links_on_hour: bool,
    pub map_template: String,
    pub link_count: usize,
    pub alarm: AlarmConfig,
    pub alarm_triggered: bool,
    pub overlay_active: bool,
    pub celebrating: bool,
}

/// Process-wide tracker state.
pub struct Tracker<S: KvStore> {
    persistence: Persistence<S>,
    claimed: ClaimedSet,
    template: MapTemplate,
    links: LinkTable,
    filter_only_unclaimed: bool,
    auto_clear_links_on_hour: bool,
    alarm: AlarmMachine,
    celebration: CelebrationLatch,
    hour_latch: EdgeLatch,
    countdown: Countdown,
}

impl<S: KvStore> Tracker<S> {
    /// Restore every field from `store`, defaulting each one independently.
    pub fn load(store: S) -> Self {
        Self::load_with_alarm_defaults(store, AlarmConfig::default())
    }

    /// Like [`Tracker::load`], with the alarm settings to use when none are
    /// stored yet.
    pub fn load_with_alarm_defaults(store: S, alarm_defaults: AlarmConfig) -> Self {
        let persistence = Persistence::new(store);
        let claimed = persistence.load_claimed();
        let celebration = CelebrationLatch::primed(claimed.count());
        let tracker = Self {
            claimed,
            template: persistence.load_template(),
            links: persistence.load_links(),
            filter_only_unclaimed: persistence.load_filter(),
            auto_clear_links_on_hour: persistence.load_auto_clear_links(),
            alarm: AlarmMachine::new(persistence.load_alarm_or(alarm_defaults)),
            celebration,
            hour_latch: EdgeLatch::new(),
            countdown: Countdown::from_ms(MS_PER_HOUR),
            persistence,
        };
        tracing::debug!(
            claimed = tracker.claimed.count(),
            links = tracker.links.len(),
            "tracker loaded"
        );
        tracker
    }

    /// Re-read every stored field, picking up writes made by another
    /// process since the last load. Runtime state (countdown, hour latch,
    /// the alarm's trigger latch when its threshold is unchanged) carries
    /// over.
    pub fn reload(&mut self) -> Vec<Event> {
        self.claimed = self.persistence.load_claimed();
        self.template = self.persistence.load_template();
        self.links = self.persistence.load_links();
        self.filter_only_unclaimed = self.persistence.load_filter();
        self.auto_clear_links_on_hour = self.persistence.load_auto_clear_links();

        let current = AlarmConfig {
            triggered: false,
            ..*self.alarm.config()
        };
        let mut events = self.alarm.adopt(self.persistence.load_alarm_or(current));
        events.extend(self.observe_count());
        events
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn store(&self) -> &S {
        self.persistence.store()
    }

    pub fn into_store(self) -> S {
        self.persistence.into_store()
    }

    pub fn claimed(&self) -> &ClaimedSet {
        &self.claimed
    }

    pub fn count(&self) -> usize {
        self.claimed.count()
    }

    pub fn is_claimed(&self, n: PumpkinNumber) -> bool {
        self.claimed.contains(n)
    }

    pub fn visible_numbers(&self) -> Vec<u8> {
        self.claimed.visible(self.filter_only_unclaimed)
    }

    pub fn next_unclaimed(&self) -> Option<PumpkinNumber> {
        self.claimed.next_unclaimed()
    }

    pub fn filter_only_unclaimed(&self) -> bool {
        self.filter_only_unclaimed
    }

    pub fn auto_clear_links_on_hour(&self) -> bool {
        self.auto_clear_links_on_hour
    }

    pub fn template(&self) -> &MapTemplate {
        &self.template
    }

    pub fn links(&self) -> &LinkTable {
        &self.links
    }

    /// Stored link for `n`, or the template filled in for `n`.
    pub fn url_for(&self, n: PumpkinNumber) -> String {
        self.links
            .get(n)
            .map(str::to_string)
            .unwrap_or_else(|| self.template.url_for(n))
    }

    pub fn alarm(&self) -> &AlarmMachine {
        &self.alarm
    }

    pub fn celebrating(&self) -> bool {
        self.celebration.is_showing()
    }

    /// Countdown as of the last tick.
    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    /// The export document for the current state.
    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            claimed: self.claimed.sorted(),
            map_template: self.template.clone(),
            map_links: self.links.clone(),
            filter_only_unclaimed: self.filter_only_unclaimed,
            auto_clear_links_on_hour: self.auto_clear_links_on_hour,
        }
    }

    pub fn view(&self) -> TrackerView {
        TrackerView {
            claimed: self.claimed.sorted(),
            claimed_count: self.count(),
            total: TOTAL,
            visible: self.visible_numbers(),
            countdown: self.countdown.mmss(),
            ms_until_next_hour: self.countdown.ms_until_next_hour(),
            filter_only_unclaimed: self.filter_only_unclaimed,
            auto_clear_links_on_hour: self.auto_clear_links_on_hour,
            map_template: self.template.as_str().to_string(),
            link_count: self.links.len(),
            alarm: *self.alarm.config(),
            alarm_triggered: self.alarm.is_triggered(),
            overlay_active: self.alarm.overlay_active(),
            celebrating: self.celebrating(),
        }
    }

    // ── Claims ───────────────────────────────────────────────────────

    /// Set the claim state of `n`. Persists even when nothing changed.
    pub fn toggle(&mut self, n: PumpkinNumber, desired: bool) -> Vec<Event> {
        self.claimed.toggle(n, desired);
        let result = self.persistence.save_claimed(&self.claimed);
        self.persisted("claimed", result);

        let mut events = vec![Event::ClaimToggled {
            number: n.get(),
            claimed: desired,
            count: self.count(),
        }];
        events.extend(self.observe_count());
        events
    }

    /// Uncheck everything, after the user confirms.
    pub fn clear_all(&mut self, prompt: &mut dyn Prompt) -> Vec<Event> {
        if !prompt.confirm(CLEAR_CONFIRMATION) {
            return Vec::new();
        }
        self.claimed.clear();
        let result = self.persistence.save_claimed(&self.claimed);
        self.persisted("claimed", result);

        let mut events = vec![Event::ClaimsCleared];
        events.extend(self.observe_count());
        events
    }

    /// The renderer finished playing the celebration.
    pub fn finish_celebration(&mut self) {
        self.celebration.finish();
        self.celebration.observe(self.count());
    }

    fn observe_count(&mut self) -> Option<Event> {
        if self.celebration.observe(self.count()) {
            tracing::info!("all {TOTAL} pumpkins claimed");
            Some(Event::CelebrationStarted)
        } else {
            None
        }
    }

    // ── Settings and links ───────────────────────────────────────────

    pub fn set_filter(&mut self, only_unclaimed: bool) -> Vec<Event> {
        self.filter_only_unclaimed = only_unclaimed;
        let result = self.persistence.save_filter(only_unclaimed);
        self.persisted("filter", result);
        vec![Event::FilterChanged { only_unclaimed }]
    }

    pub fn set_auto_clear_links(&mut self, enabled: bool) -> Vec<Event> {
        self.auto_clear_links_on_hour = enabled;
        let result = self.persistence.save_auto_clear_links(enabled);
        self.persisted("auto-clear", result);
        vec![Event::AutoClearChanged { enabled }]
    }

    /// Replace the URL template. An empty template restores the default.
    pub fn set_template(&mut self, template: &str) -> Vec<Event> {
        self.template = MapTemplate::new(template);
        let result = self.persistence.save_template(&self.template);
        self.persisted("template", result);
        vec![Event::TemplateChanged {
            template: self.template.as_str().to_string(),
        }]
    }

    /// Store a link for `n`. Rejects anything that is not a URL.
    pub fn set_link(&mut self, n: PumpkinNumber, url: &str) -> Result<Vec<Event>> {
        self.links.set(n, url)?;
        let result = self.persistence.save_links(&self.links);
        self.persisted("links", result);
        Ok(vec![Event::LinkSet {
            number: n.get(),
            url: url.to_string(),
        }])
    }

    pub fn clear_link(&mut self, n: PumpkinNumber) -> Vec<Event> {
        self.links.remove(n);
        let result = self.persistence.save_links(&self.links);
        self.persisted("links", result);
        vec![Event::LinkCleared { number: n.get() }]
    }

    pub fn clear_links(&mut self) -> Vec<Event> {
        self.links.clear();
        let result = self.persistence.save_links(&self.links);
        self.persisted("links", result);
        vec![Event::LinksCleared]
    }

    // ── Export / import ──────────────────────────────────────────────

    /// Copy the export document to the clipboard, or save it as
    /// `file_name` when the clipboard is unavailable.
    pub fn export(
        &self,
        clipboard: &mut dyn Clipboard,
        download: &mut dyn FileDownload,
        file_name: &str,
    ) -> Result<ExportOutcome> {
        let payload = codec::encode(&self.persisted_state());
        match clipboard.write_text(&payload) {
            Ok(()) => Ok(ExportOutcome::Clipboard),
            Err(err) => {
                tracing::info!("clipboard write failed, saving {file_name} instead: {err}");
                let path = download.download(file_name, &payload)?;
                Ok(ExportOutcome::File { path })
            }
        }
    }

    /// Replace all exportable state with the document in `text`.
    ///
    /// # Errors
    /// [`CoreError::InvalidImport`] when `text` is not JSON; nothing changes.
    pub fn import_text(&mut self, text: &str) -> Result<Vec<Event>> {
        let state = codec::decode(text).ok_or(CoreError::InvalidImport)?;
        Ok(self.apply_state(state))
    }

    /// Ask the user to paste a document, then import it. Cancelling is not
    /// an error and changes nothing.
    pub fn import_from_prompt(&mut self, prompt: &mut dyn Prompt, source_hint: &str) -> Result<Vec<Event>> {
        let message = format!("Paste exported JSON, or contents of\n{source_hint}");
        match prompt.text(&message) {
            Some(text) => self.import_text(&text),
            None => Ok(Vec::new()),
        }
    }

    fn apply_state(&mut self, state: PersistedState) -> Vec<Event> {
        self.claimed = state
            .claimed
            .iter()
            .filter_map(|n| PumpkinNumber::new((*n).into()).ok())
            .collect();
        self.template = state.map_template;
        self.links = state.map_links;
        self.filter_only_unclaimed = state.filter_only_unclaimed;
        self.auto_clear_links_on_hour = state.auto_clear_links_on_hour;

        let result = self.persistence.save_claimed(&self.claimed);
        self.persisted("claimed", result);
        let result = self.persistence.save_template(&self.template);
        self.persisted("template", result);
        let result = self.persistence.save_links(&self.links);
        self.persisted("links", result);
        let result = self.persistence.save_filter(self.filter_only_unclaimed);
        self.persisted("filter", result);
        let result = self.persistence.save_auto_clear_links(self.auto_clear_links_on_hour);
        self.persisted("auto-clear", result);

        tracing::info!(claimed = self.count(), links = self.links.len(), "import applied");
        let mut events = vec![Event::Imported {
            claimed: self.count(),
            links: self.links.len(),
        }];
        events.extend(self.observe_count());
        events
    }

    // ── Alarm ────────────────────────────────────────────────────────

    /// Arm the wave-end alarm `minutes` before the hour.
    ///
    /// Asks for notification permission first when it can; without it the
    /// alarm still arms and fires on the visual and audible channels.
    pub fn set_alarm(
        &mut self,
        minutes: u32,
        notifier: &mut dyn NotificationService,
    ) -> Result<Vec<Event>> {
        let mut events = self.alarm.arm(minutes)?;
        let result = self.persistence.save_alarm(self.alarm.config());
        self.persisted("alarm", result);

        let permission = notifier.permission();
        if permission.is_supported() && permission != NotificationPermission::Granted {
            let answer = notifier.request_permission();
            if answer != NotificationPermission::Granted {
                events.push(Event::advisory("Enable desktop notifications to receive alerts"));
            }
        }

        let plural = if minutes == 1 { "" } else { "s" };
        events.push(Event::advisory(format!(
            "Wave end timer set for {minutes} minute{plural} before the hour"
        )));
        Ok(events)
    }

    pub fn toggle_indicator(&mut self, channel: AlarmChannel) -> Vec<Event> {
        let events = self.alarm.toggle_indicator(channel);
        let result = self.persistence.save_alarm(self.alarm.config());
        self.persisted("alarm", result);
        events
    }

    pub fn clear_alarm(&mut self) -> Vec<Event> {
        let events = self.alarm.clear();
        let result = self.persistence.save_alarm(self.alarm.config());
        self.persisted("alarm", result);
        events
    }

    /// A key or pointer press anywhere. Dismisses the overlay if showing.
    pub fn user_interaction(&mut self) -> Vec<Event> {
        self.alarm.user_interaction()
    }

    // ── Clock ────────────────────────────────────────────────────────

    /// Feed one countdown sample: handles the top-of-hour edge and the
    /// alarm. Due notifications go straight to `notifier`.
    pub fn tick(&mut self, countdown: Countdown, notifier: &mut dyn NotificationService) -> Vec<Event> {
        self.countdown = countdown;
        let mut events = Vec::new();

        if self.hour_latch.observe(countdown.at_top()) {
            let links_cleared = self.auto_clear_links_on_hour;
            if links_cleared {
                self.links.clear();
                let result = self.persistence.save_links(&self.links);
                self.persisted("links", result);
            }
            events.push(Event::HourRolledOver { links_cleared });
            if links_cleared {
                events.push(Event::advisory("Hour rolled over, cleared stored links"));
            }
        }

        let permission = notifier.permission();
        for event in self.alarm.evaluate(countdown.ms_until_next_hour(), permission) {
            if let Event::Notify { title } = &event {
                if let Err(err) = notifier.notify(title) {
                    tracing::warn!("notification failed: {err}");
                    events.push(Event::advisory(format!("Notification failed: {err}")));
                    continue;
                }
            }
            events.push(event);
        }
        events
    }

    fn persisted(&self, field: &str, result: std::result::Result<(), StorageError>) {
        if let Err(err) = result {
            tracing::warn!(field, "storage write failed: {err}");
        }
    }
}

impl Tracker<Database> {
    /// The tracker over `<data dir>/pumpkin-bingo.db`.
    ///
    /// # Errors
    /// [`CoreError::Storage`] when the data directory or database cannot be
    /// opened.
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_at(&data_dir()?.join(DB_FILE), config)
    }

    /// Like [`Tracker::open`], with an explicit database file.
    pub fn open_at(path: &Path, config: &Config) -> Result<Self> {
        let db = Database::open_at(path)?;
        Ok(Self::load_with_alarm_defaults(db, config.alarm_defaults()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::NoNotifications;
    use crate::error::CollaboratorError;
    use crate::storage::{keys, MemoryStore};

    fn n(v: i64) -> PumpkinNumber {
        PumpkinNumber::new(v).unwrap()
    }

    fn tracker() -> Tracker<MemoryStore> {
        Tracker::load(MemoryStore::new())
    }

    struct Answer(bool, Option<String>);

    impl Prompt for Answer {
        fn confirm(&mut self, _message: &str) -> bool {
            self.0
        }
        fn text(&mut self, _message: &str) -> Option<String> {
            self.1.take()
        }
    }

    #[derive(Default)]
    struct Notifier {
        permission: NotificationPermission,
        answer: NotificationPermission,
        requests: usize,
        sent: Vec<String>,
    }

    impl NotificationService for Notifier {
        fn permission(&self) -> NotificationPermission {
            self.permission
        }
        fn request_permission(&mut self) -> NotificationPermission {
            self.requests += 1;
            self.permission = self.answer;
            self.answer
        }
        fn notify(&mut self, title: &str) -> std::result::Result<(), CollaboratorError> {
            self.sent.push(title.to_string());
            Ok(())
        }
    }

    struct BrokenClipboard;

    impl Clipboard for BrokenClipboard {
        fn write_text(&mut self, _text: &str) -> std::result::Result<(), CollaboratorError> {
            Err(CollaboratorError::ClipboardUnavailable("no display".into()))
        }
    }

    #[derive(Default)]
    struct Downloads(Vec<(String, String)>);

    impl FileDownload for Downloads {
        fn download(&mut self, file_name: &str, payload: &str) -> std::result::Result<PathBuf, CollaboratorError> {
            self.0.push((file_name.to_string(), payload.to_string()));
            Ok(PathBuf::from(file_name))
        }
    }

    #[test]
    fn toggle_persists_immediately() {
        let mut t = tracker();
        t.toggle(n(42), true);
        assert_eq!(t.count(), 1);
        assert_eq!(t.store().get(keys::CLAIMED), Some("[42]"));
        t.toggle(n(42), true);
        assert_eq!(t.count(), 1);
        t.toggle(n(42), false);
        assert_eq!(t.store().get(keys::CLAIMED), Some("[]"));
    }

    #[test]
    fn clear_all_needs_confirmation() {
        let mut t = tracker();
        t.toggle(n(1), true);
        assert!(t.clear_all(&mut Answer(false, None)).is_empty());
        assert_eq!(t.count(), 1);
        assert_eq!(t.clear_all(&mut Answer(true, None)), vec![Event::ClaimsCleared]);
        assert_eq!(t.count(), 0);
        assert_eq!(t.store().get(keys::CLAIMED), Some("[]"));
    }

    #[test]
    fn celebration_fires_once_per_completion() {
        let mut t = tracker();
        for v in 1..100 {
            t.toggle(n(v), true);
        }
        let events = t.toggle(n(100), true);
        assert_eq!(events.last(), Some(&Event::CelebrationStarted));
        assert!(t.celebrating());
        assert!(!t.toggle(n(100), true).contains(&Event::CelebrationStarted));
        t.finish_celebration();
        assert!(!t.celebrating());

        t.toggle(n(50), false);
        assert!(t.toggle(n(50), true).contains(&Event::CelebrationStarted));
    }

    #[test]
    fn restored_full_set_does_not_celebrate() {
        let mut store = MemoryStore::new();
        let all: Vec<u8> = (1..=100).collect();
        store
            .kv_set(keys::CLAIMED, &serde_json::to_string(&all).unwrap())
            .unwrap();
        let mut t = Tracker::load(store);
        assert_eq!(t.count(), 100);
        assert!(!t.toggle(n(100), true).contains(&Event::CelebrationStarted));
    }

    #[test]
    fn import_replaces_rather_than_merges() {
        let mut t = tracker();
        t.toggle(n(42), true);
        t.set_link(n(9), "https://x").unwrap();
        t.set_filter(true);

        t.import_text(r#"{"claimed":[1,2,3]}"#).unwrap();
        assert_eq!(t.claimed().sorted(), vec![1, 2, 3]);
        assert!(t.links().is_empty());
        assert!(!t.filter_only_unclaimed());
        assert_eq!(t.store().get(keys::CLAIMED), Some("[1,2,3]"));
        assert_eq!(t.store().get(keys::LINKS), Some("{}"));
        assert_eq!(t.store().get(keys::FILTER), Some("0"));
    }

    #[test]
    fn invalid_import_changes_nothing() {
        let mut t = tracker();
        t.toggle(n(5), true);
        assert!(matches!(t.import_text("{nope"), Err(CoreError::InvalidImport)));
        assert_eq!(t.claimed().sorted(), vec![5]);
    }

    #[test]
    fn cancelled_prompt_import_is_a_no_op() {
        let mut t = tracker();
        t.toggle(n(5), true);
        let events = t.import_from_prompt(&mut Answer(false, None), "https://example").unwrap();
        assert!(events.is_empty());
        assert_eq!(t.count(), 1);

        let doc = Some(r#"{"claimed":[7]}"#.to_string());
        t.import_from_prompt(&mut Answer(false, doc), "https://example").unwrap();
        assert_eq!(t.claimed().sorted(), vec![7]);
    }

    #[test]
    fn export_falls_back_to_file() {
        let mut t = tracker();
        t.toggle(n(3), true);
        let mut downloads = Downloads::default();
        let outcome = t.export(&mut BrokenClipboard, &mut downloads, "pumpkins.json").unwrap();
        assert_eq!(outcome, ExportOutcome::File { path: PathBuf::from("pumpkins.json") });
        let (name, payload) = &downloads.0[0];
        assert_eq!(name, "pumpkins.json");
        assert_eq!(codec::decode(payload).unwrap().claimed, vec![3]);
    }

    #[test]
    fn url_prefers_stored_link() {
        let mut t = tracker();
        t.set_template("https://map.example/{num}");
        t.set_link(n(4), "https://stored.example/").unwrap();
        assert_eq!(t.url_for(n(4)), "https://stored.example/");
        assert_eq!(t.url_for(n(5)), "https://map.example/5");
        assert!(t.set_link(n(6), "not a url").is_err());
        assert!(t.links().get(n(6)).is_none());
    }

    #[test]
    fn hour_edge_clears_links_once_when_enabled() {
        let mut t = tracker();
        t.set_link(n(1), "https://x").unwrap();
        t.set_auto_clear_links(true);
        t.toggle(n(8), true);
        let mut notifier = NoNotifications;

        assert!(t.tick(Countdown::from_ms(1_500), &mut notifier).is_empty());
        let events = t.tick(Countdown::from_ms(750), &mut notifier);
        assert_eq!(events[0], Event::HourRolledOver { links_cleared: true });
        assert!(t.links().is_empty());
        assert_eq!(t.count(), 1);

        t.set_link(n(2), "https://y").unwrap();
        assert!(t.tick(Countdown::from_ms(500), &mut notifier).is_empty());
        assert_eq!(t.links().len(), 1);

        t.tick(Countdown::from_ms(MS_PER_HOUR), &mut notifier);
        assert!(!t.tick(Countdown::from_ms(900), &mut notifier).is_empty());
        assert!(t.links().is_empty());
    }

    #[test]
    fn hour_edge_keeps_links_when_disabled() {
        let mut t = tracker();
        t.set_link(n(1), "https://x").unwrap();
        let events = t.tick(Countdown::from_ms(10), &mut NoNotifications);
        assert_eq!(events, vec![Event::HourRolledOver { links_cleared: false }]);
        assert_eq!(t.links().len(), 1);
    }

    #[test]
    fn set_alarm_requests_permission_and_still_arms_when_denied() {
        let mut t = tracker();
        let mut notifier = Notifier {
            answer: NotificationPermission::Denied,
            ..Default::default()
        };
        let events = t.set_alarm(10, &mut notifier).unwrap();
        assert_eq!(notifier.requests, 1);
        assert!(t.alarm().is_armed());
        assert!(events.contains(&Event::advisory("Enable desktop notifications to receive alerts")));
        assert!(t.store().get(keys::ALARM).unwrap().contains("\"minutes\":10"));
    }

    #[test]
    fn set_alarm_rejects_zero_without_prompting() {
        let mut t = tracker();
        let mut notifier = Notifier::default();
        assert!(t.set_alarm(0, &mut notifier).is_err());
        assert_eq!(notifier.requests, 0);
        assert!(!t.alarm().is_armed());
    }

    #[test]
    fn tick_dispatches_granted_notifications() {
        let mut t = tracker();
        let mut notifier = Notifier {
            answer: NotificationPermission::Granted,
            ..Default::default()
        };
        t.set_alarm(5, &mut notifier).unwrap();
        assert!(t.tick(Countdown::from_ms(300_001), &mut notifier).is_empty());
        let events = t.tick(Countdown::from_ms(299_999), &mut notifier);
        assert!(events.contains(&Event::OverlayShown));
        assert_eq!(notifier.sent.len(), 1);
        assert!(t.tick(Countdown::from_ms(200_000), &mut notifier).is_empty());
        assert_eq!(notifier.sent.len(), 1);
    }

    #[test]
    fn alarm_settings_survive_reload() {
        let mut t = tracker();
        t.set_alarm(15, &mut NoNotifications).unwrap();
        t.toggle_indicator(AlarmChannel::Audible);
        let t = Tracker::load(t.into_store());
        assert!(t.alarm().is_armed());
        assert_eq!(t.alarm().config().minutes, 15);
        assert!(!t.alarm().config().audible);
        assert!(!t.alarm().is_triggered());
    }

    #[test]
    fn view_reflects_filter() {
        let mut t = tracker();
        t.toggle(n(1), true);
        t.set_filter(true);
        let view = t.view();
        assert_eq!(view.claimed_count, 1);
        assert_eq!(view.visible.len(), 99);
        assert_eq!(view.countdown, "60:00");
    }

    #[test]
    fn reload_picks_up_external_writes() {
        let mut t = tracker();
        t.set_alarm(5, &mut NoNotifications).unwrap();
        let mut other = Tracker::load(t.store().clone());
        other.toggle(n(5), true);
        other.clear_alarm();
        other.set_link(n(9), "https://x").unwrap();
        let mut t = Tracker { persistence: Persistence::new(other.into_store()), ..t };

        t.reload();
        t.toggle(n(6), true);
        assert_eq!(t.claimed().sorted(), vec![5, 6]);
        assert_eq!(t.links().len(), 1);
        assert!(!t.alarm().is_armed());
        assert!(t.tick(Countdown::from_ms(1_000), &mut NoNotifications)
            .iter()
            .all(|e| !matches!(e, Event::AlarmTriggered { .. })));
    }

    #[test]
    fn reload_celebrates_an_external_completion() {
        let mut t = tracker();
        let mut store = t.store().clone();
        let all: Vec<u8> = (1..=100).collect();
        store
            .kv_set(keys::CLAIMED, &serde_json::to_string(&all).unwrap())
            .unwrap();
        t = Tracker { persistence: Persistence::new(store), ..t };
        assert_eq!(t.reload(), vec![Event::CelebrationStarted]);
        assert!(t.reload().is_empty());
    }

    #[test]
    fn open_reports_unopenable_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("pumpkin-bingo.db");
        let result = Tracker::open_at(&path, &Config::default());
        assert!(matches!(
            result,
            Err(CoreError::Storage(StorageError::OpenFailed { .. }))
        ));
    }
}
