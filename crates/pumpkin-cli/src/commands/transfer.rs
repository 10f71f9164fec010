use std::path::Path;

use pumpkin_core::codec;
use pumpkin_core::{Config, ExportOutcome};

use crate::host::{self, DirDownload, SystemClipboard, TerminalPrompt};

pub fn export(stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let tracker = host::open_tracker(&config)?;

    if stdout {
        println!("{}", codec::encode(&tracker.persisted_state()));
        return Ok(());
    }

    let mut download = DirDownload::new(&config.export.download_dir);
    match tracker.export(&mut SystemClipboard, &mut download, &config.export.file_name)? {
        ExportOutcome::Clipboard => println!("Copied to clipboard"),
        ExportOutcome::File { path } => println!("Saved {}", path.display()),
    }
    Ok(())
}

/// Replaces claims, links and settings with the imported document.
pub fn import(file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut tracker = host::open_tracker(&config)?;

    let events = match file {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            tracker.import_text(&text)?
        }
        None => tracker.import_from_prompt(
            &mut TerminalPrompt::new(false),
            &config.import.claimed_source_url,
        )?,
    };
    if events.is_empty() {
        println!("nothing imported");
    }
    host::report(&events);
    Ok(())
}
