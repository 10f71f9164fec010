use clap::{Subcommand, ValueEnum};
use pumpkin_core::{Config, PumpkinNumber};

use crate::host;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl From<Switch> for bool {
    fn from(s: Switch) -> bool {
        s == Switch::On
    }
}

#[derive(Subcommand)]
pub enum TemplateAction {
    /// Print the current template
    Get,
    /// Replace the template; `{num}` is filled with the pumpkin number
    Set {
        /// New template (empty restores the default)
        template: String,
    },
}

#[derive(Subcommand)]
pub enum LinkAction {
    /// Store a map link for one pumpkin
    Set {
        number: PumpkinNumber,
        url: String,
    },
    /// Remove the link for one pumpkin
    Clear {
        number: PumpkinNumber,
    },
    /// Remove every stored link
    ClearAll,
    /// List stored links
    List {
        #[arg(long)]
        json: bool,
    },
}

pub fn filter(state: Switch) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut tracker = host::open_tracker(&config)?;
    host::report(&tracker.set_filter(state.into()));
    Ok(())
}

pub fn autoclear(state: Switch) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut tracker = host::open_tracker(&config)?;
    host::report(&tracker.set_auto_clear_links(state.into()));
    Ok(())
}

pub fn template(action: TemplateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut tracker = host::open_tracker(&config)?;
    match action {
        TemplateAction::Get => println!("{}", tracker.template().as_str()),
        TemplateAction::Set { template } => host::report(&tracker.set_template(&template)),
    }
    Ok(())
}

pub fn link(action: LinkAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut tracker = host::open_tracker(&config)?;
    match action {
        LinkAction::Set { number, url } => host::report(&tracker.set_link(number, &url)?),
        LinkAction::Clear { number } => host::report(&tracker.clear_link(number)),
        LinkAction::ClearAll => host::report(&tracker.clear_links()),
        LinkAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(tracker.links())?);
            } else if tracker.links().is_empty() {
                println!("no links stored");
            } else {
                for (n, url) in tracker.links().iter() {
                    println!("#{n} {url}");
                }
            }
        }
    }
    Ok(())
}
