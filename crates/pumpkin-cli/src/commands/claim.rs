use chrono::Local;
use pumpkin_core::claims::TOTAL;
use pumpkin_core::{Config, Countdown, PumpkinNumber, SystemClock, TrackerView};

use crate::host::{self, TerminalPrompt};

pub fn set_many(numbers: &[PumpkinNumber], desired: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut tracker = host::open_tracker(&config)?;
    for &n in numbers {
        host::report(&tracker.toggle(n, desired));
    }
    Ok(())
}

pub fn toggle(number: PumpkinNumber) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut tracker = host::open_tracker(&config)?;
    let desired = !tracker.is_claimed(number);
    host::report(&tracker.toggle(number, desired));
    Ok(())
}

pub fn clear(yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut tracker = host::open_tracker(&config)?;
    let events = tracker.clear_all(&mut TerminalPrompt::new(yes));
    if events.is_empty() {
        println!("nothing changed");
    }
    host::report(&events);
    Ok(())
}

/// The stored view with a fresh countdown. Sampling only: no alarm or
/// top-of-hour handling happens outside `watch`.
fn current_view() -> Result<TrackerView, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let tracker = host::open_tracker(&config)?;
    let countdown = Countdown::from_clock(&SystemClock);
    let mut view = tracker.view();
    view.countdown = countdown.mmss();
    view.ms_until_next_hour = countdown.ms_until_next_hour();
    Ok(view)
}

pub fn status(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let view = current_view()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let ms = i64::try_from(view.ms_until_next_hour).unwrap_or(0);
    let next_wave = Local::now() + chrono::Duration::milliseconds(ms);
    println!("Claimed:      {}/{}", view.claimed_count, view.total);
    println!("Next wave:    {} (at {})", view.countdown, next_wave.format("%H:00"));
    println!(
        "Grid shows:   {}",
        if view.filter_only_unclaimed { "only unclaimed" } else { "all" }
    );
    println!(
        "Auto-clear:   {}",
        if view.auto_clear_links_on_hour { "on" } else { "off" }
    );
    println!("Map template: {}", view.map_template);
    println!("Links:        {}", view.link_count);
    if view.alarm.active {
        println!("Alarm:        {} min before the hour", view.alarm.minutes);
    } else {
        println!("Alarm:        off");
    }
    Ok(())
}

/// Renders the 10x10 grid. Claimed cells carry a `*`; with the filter on
/// they are left blank.
fn render_grid(view: &TrackerView) -> String {
    let mut out = String::new();
    for row in 0..(TOTAL / 10) as u8 {
        let line: String = (1..=10)
            .map(|col| {
                let n = row * 10 + col;
                if !view.visible.contains(&n) {
                    "     ".to_string()
                } else if view.claimed.binary_search(&n).is_ok() {
                    format!("{n:>4}*")
                } else {
                    format!("{n:>4} ")
                }
            })
            .collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push_str(&format!(
        "{}/{} claimed, next wave in {}",
        view.claimed_count, view.total, view.countdown
    ));
    out
}

pub fn grid() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_grid(&current_view()?));
    Ok(())
}

pub fn next(open: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let tracker = host::open_tracker(&config)?;
    let Some(n) = tracker.next_unclaimed() else {
        println!("every pumpkin is claimed");
        return Ok(());
    };
    let url = tracker.url_for(n);
    println!("#{n} {url}");
    if open {
        open::that(&url)?;
    }
    Ok(())
}
