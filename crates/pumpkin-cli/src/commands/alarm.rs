use clap::Subcommand;
use pumpkin_core::alarm::ALARM_PRESETS;
use pumpkin_core::{AlarmChannel, Config};

use crate::host::{self, TerminalNotifier};

#[derive(Subcommand)]
pub enum AlarmAction {
    /// Arm the alarm N minutes before each hour (presets: 5, 10, 15)
    Set {
        /// Minutes before the hour; the configured default when omitted
        minutes: Option<u32>,
    },
    /// Disarm the alarm
    Clear,
    /// Turn one indicator channel on or off (visual, audible, alert)
    Toggle {
        channel: AlarmChannel,
    },
    /// Print the alarm settings
    Status {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: AlarmAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut tracker = host::open_tracker(&config)?;
    match action {
        AlarmAction::Set { minutes } => {
            let minutes = minutes.unwrap_or(config.alarm_defaults().minutes);
            if !ALARM_PRESETS.contains(&minutes) {
                tracing::info!(minutes, "alarm set outside the presets");
            }
            let mut notifier = TerminalNotifier::new(config);
            host::report(&tracker.set_alarm(minutes, &mut notifier)?);
        }
        AlarmAction::Clear => host::report(&tracker.clear_alarm()),
        AlarmAction::Toggle { channel } => host::report(&tracker.toggle_indicator(channel)),
        AlarmAction::Status { json } => {
            let alarm = tracker.alarm().config();
            if json {
                println!("{}", serde_json::to_string_pretty(alarm)?);
                return Ok(());
            }
            if alarm.active {
                println!("armed: {} min before the hour", alarm.minutes);
            } else {
                println!("off");
            }
            for channel in AlarmChannel::ALL {
                let state = if alarm.channel(channel) { "on" } else { "off" };
                println!("{channel}: {state}");
            }
        }
    }
    Ok(())
}
