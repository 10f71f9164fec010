use clap::{CommandFactory, Parser, Subcommand};
use pumpkin_core::PumpkinNumber;
use tracing_subscriber::EnvFilter;

mod commands;
mod host;

#[derive(Parser)]
#[command(name = "pumpkin-bingo", version, about = "Pumpkin Bingo tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mark pumpkins as claimed
    Claim {
        /// Pumpkin numbers (1-100)
        #[arg(required = true)]
        numbers: Vec<PumpkinNumber>,
    },
    /// Mark pumpkins as not claimed
    Unclaim {
        /// Pumpkin numbers (1-100)
        #[arg(required = true)]
        numbers: Vec<PumpkinNumber>,
    },
    /// Flip the claim state of one pumpkin
    Toggle {
        number: PumpkinNumber,
    },
    /// Print claim count, countdown and settings
    Status {
        /// Print the full tracker view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the 10x10 pumpkin grid
    Grid,
    /// Uncheck every pumpkin
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Export claims and settings as JSON
    Export {
        /// Print the document instead of copying it
        #[arg(long)]
        stdout: bool,
    },
    /// Import claims and settings, replacing the current ones
    Import {
        /// JSON file to read; pasted from stdin when omitted
        file: Option<std::path::PathBuf>,
    },
    /// Show only unclaimed pumpkins in the grid
    Filter {
        state: commands::settings::Switch,
    },
    /// Clear stored links at the top of every hour
    Autoclear {
        state: commands::settings::Switch,
    },
    /// Map URL template
    Template {
        #[command(subcommand)]
        action: commands::settings::TemplateAction,
    },
    /// Per-pumpkin map links
    Link {
        #[command(subcommand)]
        action: commands::settings::LinkAction,
    },
    /// Print the lowest unclaimed pumpkin and its map link
    Next {
        /// Open the link in the browser
        #[arg(long)]
        open: bool,
    },
    /// Wave-end alarm
    Alarm {
        #[command(subcommand)]
        action: commands::alarm::AlarmAction,
    },
    /// Live countdown with the wave-end alarm
    Watch,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PUMPKIN_BINGO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Claim { numbers } => commands::claim::set_many(&numbers, true),
        Commands::Unclaim { numbers } => commands::claim::set_many(&numbers, false),
        Commands::Toggle { number } => commands::claim::toggle(number),
        Commands::Status { json } => commands::claim::status(json),
        Commands::Grid => commands::claim::grid(),
        Commands::Clear { yes } => commands::claim::clear(yes),
        Commands::Export { stdout } => commands::transfer::export(stdout),
        Commands::Import { file } => commands::transfer::import(file.as_deref()),
        Commands::Filter { state } => commands::settings::filter(state),
        Commands::Autoclear { state } => commands::settings::autoclear(state),
        Commands::Template { action } => commands::settings::template(action),
        Commands::Link { action } => commands::settings::link(action),
        Commands::Next { open } => commands::claim::next(open),
        Commands::Alarm { action } => commands::alarm::run(action),
        Commands::Watch => commands::watch::run(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "pumpkin-bingo", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
