//! Property-based tests for the codec, the claim set and the alarm latch.
//!
//! Uses proptest to generate random inputs and validate the tracker's
//! invariants.

use proptest::prelude::*;
use pumpkin_core::codec::{decode, encode, PersistedState};
use pumpkin_core::{
    AlarmMachine, ClaimedSet, Event, LinkTable, MapTemplate, NotificationPermission, PumpkinNumber,
};

fn state_strategy() -> impl Strategy<Value = PersistedState> {
    (
        prop::collection::btree_set(1u8..=100, 0..=100),
        prop::option::of("https://[a-z]{1,12}\\.example/\\{num\\}"),
        prop::collection::btree_map(1u8..=100, "https://[a-z]{1,8}\\.example/[a-z0-9]{0,6}", 0..10),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(claimed, template, links, filter, auto_clear)| {
            let mut table = LinkTable::new();
            for (n, url) in links {
                table
                    .set(PumpkinNumber::new(n.into()).unwrap(), &url)
                    .unwrap();
            }
            PersistedState {
                claimed: claimed.into_iter().collect(),
                map_template: template.map(MapTemplate::new).unwrap_or_default(),
                map_links: table,
                filter_only_unclaimed: filter,
                auto_clear_links_on_hour: auto_clear,
            }
        })
}

proptest! {
    #[test]
    fn decode_inverts_encode(state in state_strategy()) {
        prop_assert_eq!(decode(&encode(&state)), Some(state));
    }

    #[test]
    fn decode_never_panics(text in ".*") {
        let _ = decode(&text);
    }

    #[test]
    fn decoded_claims_are_always_in_range(
        values in prop::collection::vec(-1000i64..1000, 0..50)
    ) {
        let doc = serde_json::json!({ "claimed": values }).to_string();
        let state = decode(&doc).unwrap();
        prop_assert!(state.claimed.iter().all(|n| (1..=100).contains(n)));
        let expected: Vec<u8> = values
            .iter()
            .filter(|v| (1..=100).contains(*v))
            .map(|v| *v as u8)
            .collect();
        prop_assert_eq!(state.claimed, expected);
    }

    #[test]
    fn any_json_value_decodes(value in prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i64>().prop_map(serde_json::Value::from),
        ".{0,20}".prop_map(serde_json::Value::from),
    ]) {
        prop_assert!(decode(&value.to_string()).is_some());
    }

    #[test]
    fn last_toggle_wins(ops in prop::collection::vec((1i64..=100, any::<bool>()), 1..200)) {
        let mut set = ClaimedSet::new();
        for (n, desired) in &ops {
            set.toggle(PumpkinNumber::new(*n).unwrap(), *desired);
        }
        for n in 1..=100i64 {
            let last = ops.iter().rev().find(|(m, _)| *m == n).map(|(_, d)| *d);
            if let Some(desired) = last {
                prop_assert_eq!(set.contains(PumpkinNumber::new(n).unwrap()), desired);
            }
        }
    }

    #[test]
    fn matching_toggle_keeps_cardinality(
        seed in prop::collection::btree_set(1i64..=100, 0..100),
        n in 1i64..=100,
    ) {
        let mut set: ClaimedSet = seed.iter().map(|v| PumpkinNumber::new(*v).unwrap()).collect();
        let number = PumpkinNumber::new(n).unwrap();
        let before = set.count();
        let member = set.contains(number);
        set.toggle(number, member);
        prop_assert_eq!(set.count(), before);
    }

    #[test]
    fn alarm_triggers_once_per_downward_crossing(
        minutes in 1u32..=59,
        step in 500u64..20_000,
    ) {
        let mut alarm = AlarmMachine::default();
        alarm.arm(minutes).unwrap();
        let mut triggers = 0;
        let mut rearms = 0;
        // two full hours, countdown restarting at the boundary
        for _ in 0..2 {
            let mut ms = 3_600_000u64;
            loop {
                for event in alarm.evaluate(ms, NotificationPermission::Granted) {
                    match event {
                        Event::AlarmTriggered { .. } => triggers += 1,
                        Event::AlarmRearmed => rearms += 1,
                        _ => {}
                    }
                }
                if ms < step {
                    break;
                }
                ms -= step;
            }
        }
        prop_assert_eq!(triggers, 2);
        prop_assert_eq!(rearms, 1);
    }
}
