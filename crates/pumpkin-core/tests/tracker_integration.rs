//! Integration tests for the tracker over real storage and a simulated clock.

use chrono::{Local, TimeZone};
use pumpkin_core::collaborators::NoNotifications;
use pumpkin_core::storage::{keys, Database};
use pumpkin_core::{
    Countdown, Event, FixedClock, KvStore, NotificationService, NotificationPermission,
    PumpkinNumber, Tracker,
};

fn n(v: i64) -> PumpkinNumber {
    PumpkinNumber::new(v).unwrap()
}

struct GrantedNotifier {
    sent: usize,
}

impl NotificationService for GrantedNotifier {
    fn permission(&self) -> NotificationPermission {
        NotificationPermission::Granted
    }

    fn request_permission(&mut self) -> NotificationPermission {
        NotificationPermission::Granted
    }

    fn notify(&mut self, _title: &str) -> Result<(), pumpkin_core::CollaboratorError> {
        self.sent += 1;
        Ok(())
    }
}

#[test]
fn test_claims_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pumpkin-bingo.db");

    {
        let mut tracker = Tracker::load(Database::open_at(&path).unwrap());
        tracker.toggle(n(42), true);
        assert_eq!(tracker.count(), 1);
        assert_eq!(
            tracker.store().kv_get(keys::CLAIMED).unwrap().as_deref(),
            Some("[42]")
        );
    }

    let mut tracker = Tracker::load(Database::open_at(&path).unwrap());
    assert!(tracker.is_claimed(n(42)));

    tracker.import_text(r#"{"claimed":[1,2,3]}"#).unwrap();
    assert_eq!(tracker.count(), 3);
    assert!(!tracker.is_claimed(n(42)));

    let reopened = Tracker::load(Database::open_at(&path).unwrap());
    assert_eq!(reopened.claimed().sorted(), vec![1, 2, 3]);
}

#[test]
fn test_alarm_fires_once_per_hour_across_two_hours() {
    let mut tracker = Tracker::load(Database::open_memory().unwrap());
    let mut notifier = GrantedNotifier { sent: 0 };
    tracker.set_alarm(5, &mut notifier).unwrap();

    let start = Local.with_ymd_and_hms(2025, 10, 31, 12, 30, 0).unwrap();
    let clock = FixedClock::new(start);

    let mut triggered = 0;
    let mut rearmed = 0;
    // two hours of 250 ms polls
    for _ in 0..(2 * 60 * 60 * 4) {
        for event in tracker.tick(Countdown::from_clock(&clock), &mut notifier) {
            match event {
                Event::AlarmTriggered { .. } => triggered += 1,
                Event::AlarmRearmed => rearmed += 1,
                _ => {}
            }
        }
        clock.advance_ms(250);
    }

    // 12:55 and 13:55 fire; 13:00 and 14:00 re-arm
    assert_eq!(triggered, 2);
    assert_eq!(rearmed, 2);
    assert_eq!(notifier.sent, 2);
    assert!(tracker.alarm().is_armed());
}

#[test]
fn test_top_of_hour_clears_links_once_per_hour() {
    let mut tracker = Tracker::load(Database::open_memory().unwrap());
    tracker.set_auto_clear_links(true);
    tracker.toggle(n(7), true);

    let start = Local.with_ymd_and_hms(2025, 10, 31, 12, 59, 50).unwrap();
    let clock = FixedClock::new(start);
    let mut rollovers = 0;

    for step in 0..(30 * 4) {
        if step == 0 {
            tracker.set_link(n(7), "https://wplace.live/?lat=1&lng=2").unwrap();
        }
        for event in tracker.tick(Countdown::from_clock(&clock), &mut NoNotifications) {
            if event == (Event::HourRolledOver { links_cleared: true }) {
                rollovers += 1;
            }
        }
        clock.advance_ms(250);
    }

    assert_eq!(rollovers, 1);
    assert!(tracker.links().is_empty());
    assert!(tracker.is_claimed(n(7)), "claims never reset on the hour");
}

#[test]
fn test_malformed_storage_loads_defaults() {
    let mut db = Database::open_memory().unwrap();
    db.kv_set(keys::CLAIMED, "{\"not\": \"an array\"}").unwrap();
    db.kv_set(keys::LINKS, r#"{"7":"https://x","101":"https://y","abc":"https://z"}"#)
        .unwrap();
    db.kv_set(keys::ALARM, "garbage").unwrap();

    let tracker = Tracker::load(db);
    assert_eq!(tracker.count(), 0);
    assert_eq!(tracker.links().len(), 1);
    assert!(!tracker.alarm().is_armed());
}

#[test]
fn test_two_processes_share_one_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pumpkin-bingo.db");
    let mut watcher = Tracker::load(Database::open_at(&path).unwrap());
    watcher.set_alarm(5, &mut NoNotifications).unwrap();

    let mut shell = Tracker::load(Database::open_at(&path).unwrap());
    shell.toggle(n(5), true);
    shell.clear_alarm();

    watcher.reload();
    watcher.toggle(n(6), true);
    let events = watcher.tick(Countdown::from_ms(1_000), &mut NoNotifications);

    let reopened = Tracker::load(Database::open_at(&path).unwrap());
    assert_eq!(reopened.claimed().sorted(), vec![5, 6]);
    assert!(!events.iter().any(|e| matches!(e, Event::AlarmTriggered { .. })));
    assert!(!watcher.alarm().is_armed());
}
