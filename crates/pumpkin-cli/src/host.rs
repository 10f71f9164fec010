//! Terminal implementations of the tracker's collaborators, and the
//! event renderer shared by every command.

use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use pumpkin_core::storage::Database;
use pumpkin_core::{
    Clipboard, CollaboratorError, Config, Countdown, Event, FileDownload, NotificationPermission,
    NotificationService, Prompt, Tracker,
};

/// Open the tracker over the on-disk database.
pub fn open_tracker(config: &Config) -> Result<Tracker<Database>, Box<dyn std::error::Error>> {
    Ok(Tracker::open(config)?)
}

/// Human-readable line for an event, `None` for events with nothing to show.
pub fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::ClaimToggled { number, claimed, count } => {
            let state = if *claimed { "claimed" } else { "unclaimed" };
            format!("#{number} {state} ({count}/100)")
        }
        Event::ClaimsCleared => "all pumpkins unchecked".to_string(),
        Event::CelebrationStarted => "*** All 100 pumpkins claimed! ***".to_string(),
        Event::HourRolledOver { .. } => "new wave started".to_string(),
        Event::FilterChanged { only_unclaimed: true } => "showing only unclaimed pumpkins".to_string(),
        Event::FilterChanged { only_unclaimed: false } => "showing all pumpkins".to_string(),
        Event::AutoClearChanged { enabled: true } => "links will be cleared at the top of the hour".to_string(),
        Event::AutoClearChanged { enabled: false } => "links are kept across hours".to_string(),
        Event::TemplateChanged { template } => format!("map template: {template}"),
        Event::LinkSet { number, url } => format!("#{number} -> {url}"),
        Event::LinkCleared { number } => format!("#{number} link cleared"),
        Event::LinksCleared => "all links cleared".to_string(),
        Event::Imported { claimed, links } => {
            format!("imported {claimed} claimed pumpkins and {links} links")
        }
        Event::AlarmCleared => "wave end alarm cleared".to_string(),
        Event::IndicatorToggled { channel, enabled } => {
            format!("{channel} indicator {}", if *enabled { "on" } else { "off" })
        }
        Event::AlarmTriggered { ms_until_next_hour, .. } => {
            format!("wave ends in {}", Countdown::from_ms(*ms_until_next_hour).mmss())
        }
        Event::OverlayShown => {
            "==== CHECK FOR PLACEKINS! (press Enter to dismiss) ====".to_string()
        }
        Event::OverlayDismissed => "alarm dismissed".to_string(),
        Event::SoundRequested => "\x07".to_string(),
        Event::Advisory { message } => message.clone(),
        Event::AlarmArmed { .. } | Event::AlarmRearmed | Event::Notify { .. } => return None,
    };
    Some(line)
}

/// Print every event that has something to say.
pub fn report(events: &[Event]) {
    for line in events.iter().filter_map(describe) {
        println!("{line}");
    }
}

fn read_stdin_line() -> Option<String> {
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

/// Prompts on stderr, answers from stdin.
pub struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{message} [y/N] ");
        let _ = io::stderr().flush();
        matches!(
            read_stdin_line().as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("y" | "yes")
        )
    }

    /// Reads stdin to the end so multi-line documents can be pasted.
    fn text(&mut self, message: &str) -> Option<String> {
        eprintln!("{message}");
        eprintln!("(finish with Ctrl-D)");
        let mut text = String::new();
        if let Err(err) = io::stdin().read_to_string(&mut text) {
            tracing::warn!("reading stdin failed: {err}");
            return None;
        }
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

const CLIPBOARD_COMMANDS: &[&[&str]] = &[
    &["pbcopy"],
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
    &["xsel", "--clipboard", "--input"],
    &["clip.exe"],
];

/// Clipboard through whichever copy utility the system has.
pub struct SystemClipboard;

impl SystemClipboard {
    fn try_command(argv: &[&str], text: &str) -> io::Result<bool> {
        let mut child = Command::new(argv[0])
            .args(&argv[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }
        Ok(child.wait()?.success())
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), CollaboratorError> {
        for argv in CLIPBOARD_COMMANDS {
            match Self::try_command(argv, text) {
                Ok(true) => {
                    tracing::debug!(command = argv[0], "copied to clipboard");
                    return Ok(());
                }
                Ok(false) => tracing::debug!(command = argv[0], "clipboard command failed"),
                Err(err) => tracing::debug!(command = argv[0], "clipboard command unavailable: {err}"),
            }
        }
        Err(CollaboratorError::ClipboardUnavailable(
            "no working clipboard command".into(),
        ))
    }
}

/// Writes downloads into a fixed directory.
pub struct DirDownload {
    dir: PathBuf,
}

impl DirDownload {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileDownload for DirDownload {
    fn download(&mut self, file_name: &str, payload: &str) -> Result<PathBuf, CollaboratorError> {
        let path = self.dir.join(file_name);
        let failed = |source| CollaboratorError::DownloadFailed {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(failed)?;
        std::fs::write(&path, payload).map_err(failed)?;
        Ok(path)
    }
}

/// Terminal "notifications": a bell and a banner on stderr. The
/// permission answer lives in the config file.
pub struct TerminalNotifier {
    config: Config,
    interactive: bool,
}

impl TerminalNotifier {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            interactive: true,
        }
    }

    /// Never prompts; permission requests report the stored answer. For
    /// callers that already own stdin.
    pub fn non_interactive(config: Config) -> Self {
        Self {
            config,
            interactive: false,
        }
    }
}

impl NotificationService for TerminalNotifier {
    fn permission(&self) -> NotificationPermission {
        self.config.notification_permission()
    }

    fn request_permission(&mut self) -> NotificationPermission {
        let current = self.permission();
        if !current.is_supported() || !self.interactive {
            return current;
        }
        eprint!("Allow desktop notifications? [y/N] ");
        let _ = io::stderr().flush();
        let answer = match read_stdin_line() {
            None => return current,
            Some(line) if matches!(line.to_ascii_lowercase().as_str(), "y" | "yes") => {
                NotificationPermission::Granted
            }
            Some(_) => NotificationPermission::Denied,
        };
        self.config.notifications.permission = answer;
        if let Err(err) = self.config.save() {
            tracing::warn!("could not save notification permission: {err}");
        }
        answer
    }

    fn notify(&mut self, title: &str) -> Result<(), CollaboratorError> {
        let mut stderr = io::stderr();
        writeln!(stderr, "\x07[pumpkin-bingo] {title}")
            .map_err(|e| CollaboratorError::NotificationFailed(e.to_string()))
    }
}
