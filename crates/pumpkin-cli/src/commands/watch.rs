//! Live countdown. One task owns the tracker and multiplexes the polling
//! interval, stdin and Ctrl-C. Every intent typed at the prompt goes
//! through that task, and stored state is re-read before each tick and
//! each command so writes from other `pumpkin-bingo` invocations are not
//! overwritten.

use std::io::Write;
use std::path::PathBuf;

use pumpkin_core::storage::Database;
use pumpkin_core::{
    AlarmChannel, Config, Countdown, Event, KvStore, NotificationService, PumpkinNumber,
    SystemClock, Tracker,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use crate::host::{self, TerminalNotifier, TerminalPrompt};

const HELP: &str = "\
commands:
  <number>           toggle a pumpkin
  <empty line>       dismiss the alarm
  alarm set [N]      arm the alarm N minutes before the hour
  alarm clear        disarm the alarm
  visual|audible|alert
                     turn an indicator channel on or off
  filter on|off      show only unclaimed pumpkins
  autoclear on|off   clear links at the top of the hour
  import <file>      replace claims and settings from a JSON file
  clear yes          uncheck every pumpkin
  help               this list";

/// One line typed while watching.
#[derive(Debug, Clone, PartialEq, Eq)]
enum WatchCommand {
    Dismiss,
    Toggle(PumpkinNumber),
    SetAlarm(Option<u32>),
    ClearAlarm,
    Indicator(AlarmChannel),
    Filter(bool),
    AutoClear(bool),
    Import(PathBuf),
    /// `clear` without the confirmation word.
    ClearRequested,
    ClearConfirmed,
    Help,
}

fn parse_switch(word: Option<&str>) -> Result<bool, String> {
    match word {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        _ => Err("expected on or off".to_string()),
    }
}

fn parse_command(line: &str) -> Result<WatchCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(WatchCommand::Dismiss);
    }
    if line.chars().all(|c| c.is_ascii_digit()) {
        return line
            .parse::<PumpkinNumber>()
            .map(WatchCommand::Toggle)
            .map_err(|e| e.to_string());
    }

    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or_default().to_ascii_lowercase();
    let command = match head.as_str() {
        "alarm" => match words.next() {
            Some("set") => {
                let minutes = words
                    .next()
                    .map(|m| {
                        m.parse::<u32>()
                            .map_err(|_| format!("'{m}' is not a number of minutes"))
                    })
                    .transpose()?;
                WatchCommand::SetAlarm(minutes)
            }
            Some("clear") => WatchCommand::ClearAlarm,
            _ => return Err("usage: alarm set [N] | alarm clear".to_string()),
        },
        "visual" | "audible" | "alert" => WatchCommand::Indicator(
            head.parse::<AlarmChannel>().map_err(|e| e.to_string())?,
        ),
        "filter" => WatchCommand::Filter(parse_switch(words.next())?),
        "autoclear" => WatchCommand::AutoClear(parse_switch(words.next())?),
        "import" => match line.split_once(char::is_whitespace) {
            Some((_, path)) if !path.trim().is_empty() => WatchCommand::Import(PathBuf::from(path.trim())),
            _ => return Err("usage: import <file>".to_string()),
        },
        "clear" => match words.next() {
            Some("yes") => WatchCommand::ClearConfirmed,
            _ => WatchCommand::ClearRequested,
        },
        "help" | "?" => WatchCommand::Help,
        other => return Err(format!("unknown command '{other}', type help")),
    };
    Ok(command)
}

/// Run one command against the tracker.
fn apply<S: KvStore>(
    tracker: &mut Tracker<S>,
    command: WatchCommand,
    notifier: &mut dyn NotificationService,
    default_minutes: u32,
) -> Result<Vec<Event>, Box<dyn std::error::Error>> {
    let events = match command {
        WatchCommand::Dismiss => Vec::new(),
        WatchCommand::Toggle(n) => {
            let desired = !tracker.is_claimed(n);
            tracker.toggle(n, desired)
        }
        WatchCommand::SetAlarm(minutes) => {
            tracker.set_alarm(minutes.unwrap_or(default_minutes), notifier)?
        }
        WatchCommand::ClearAlarm => tracker.clear_alarm(),
        WatchCommand::Indicator(channel) => tracker.toggle_indicator(channel),
        WatchCommand::Filter(on) => tracker.set_filter(on),
        WatchCommand::AutoClear(on) => tracker.set_auto_clear_links(on),
        WatchCommand::Import(path) => {
            let text = std::fs::read_to_string(&path)?;
            tracker.import_text(&text)?
        }
        WatchCommand::ClearRequested => vec![Event::advisory(
            "Uncheck all pumpkins? Type `clear yes` to confirm.",
        )],
        WatchCommand::ClearConfirmed => tracker.clear_all(&mut TerminalPrompt::new(true)),
        WatchCommand::Help => vec![Event::advisory(HELP)],
    };
    Ok(events)
}

/// Handle one stdin line: any input counts as an interaction, then the
/// command itself runs. Errors become advisories; the loop keeps going.
fn handle_line<S: KvStore>(
    tracker: &mut Tracker<S>,
    line: &str,
    notifier: &mut dyn NotificationService,
    default_minutes: u32,
) -> Vec<Event> {
    let mut events = tracker.reload();
    events.extend(tracker.user_interaction());
    let result = parse_command(line)
        .map_err(Box::<dyn std::error::Error>::from)
        .and_then(|command| apply(tracker, command, notifier, default_minutes));
    match result {
        Ok(more) => events.extend(more),
        Err(err) => events.push(Event::advisory(format!("error: {err}"))),
    }
    events
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch())
}

async fn watch() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut tracker = host::open_tracker(&config)?;
    let mut ticker = tokio::time::interval(config.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let default_minutes = config.alarm_defaults().minutes;
    // stdin belongs to the command reader, so permission is never prompted here
    let mut notifier = TerminalNotifier::non_interactive(config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut shown = String::new();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    println!("Enter a number to toggle it, an empty line to dismiss the alarm, help for more, Ctrl-C to quit.");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let mut events = tracker.reload();
                events.extend(tracker.tick(Countdown::from_clock(&SystemClock), &mut notifier));
                if print_events(&mut tracker, &events) {
                    shown.clear();
                }
                let line = status_line(&tracker);
                if line != shown {
                    print!("\r{line:<64}");
                    let _ = std::io::stdout().flush();
                    shown = line;
                }
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    let events = handle_line(&mut tracker, &line, &mut notifier, default_minutes);
                    print_events(&mut tracker, &events);
                    shown.clear();
                }
                Ok(None) => stdin_open = false,
                Err(err) => {
                    tracing::warn!("stdin closed: {err}");
                    stdin_open = false;
                }
            },
            _ = &mut ctrl_c => break,
        }
    }
    println!();
    Ok(())
}

fn status_line(tracker: &Tracker<Database>) -> String {
    let mut line = format!(
        "next wave in {}  {}/100 claimed",
        tracker.countdown().mmss(),
        tracker.count()
    );
    if tracker.alarm().is_armed() {
        line.push_str(&format!("  alarm {}m", tracker.alarm().config().minutes));
    }
    if tracker.alarm().overlay_active() {
        line.push_str("  [CHECK FOR PLACEKINS]");
    }
    line
}

/// Returns whether anything was printed.
fn print_events(tracker: &mut Tracker<Database>, events: &[Event]) -> bool {
    if events.iter().all(|e| host::describe(e).is_none()) {
        return false;
    }
    println!();
    host::report(events);
    if events.contains(&Event::CelebrationStarted) {
        tracker.finish_celebration();
    }
    true
}
