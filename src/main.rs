mod calc;
mod cmd;
mod data;
mod error;
mod gesture;
mod logging;
mod service;
mod ui;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

const LOG_FILE: &str = "dtrack.log";

#[derive(Parser)]
#[command(name = "dtrack", about = "track how long ago recurring chores were last done")]
struct Cli {
    /// Path to the data directory containing config.yaml and states.json (default: ./config)
    #[arg(long, default_value = "./config")]
    data_dir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample card configuration and host state
    Init,
    /// Print the status of every tracked item
    Status,
    /// Mark an item as done today, or on a given date
    Done {
        /// Entity id, e.g. input_datetime.water_plants
        entity_id: String,
        /// Date to record instead of today (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Resolve data_dir to an absolute path so file I/O works regardless of
    // future directory changes within the process.
    let data_dir = if cli.data_dir.is_absolute() {
        cli.data_dir.clone()
    } else {
        std::env::current_dir()?.join(&cli.data_dir)
    };
    data::persistence::set_data_dir(data_dir.clone());

    // Checked before logging starts, since the log file lives in the same dir.
    let is_init_command = matches!(cli.command, Some(Commands::Init));
    let needs_init = !is_init_command && dir_needs_init(&data_dir);

    // The card view owns the terminal, so its logs go to a file.
    if cli.command.is_none() {
        std::fs::create_dir_all(&data_dir)?;
        logging::init_tracing(cli.verbose, Some(data_dir.join(LOG_FILE).as_path()))?;
    } else {
        logging::init_tracing(cli.verbose, None)?;
    }

    if needs_init {
        eprintln!(
            "Data directory '{}' is missing or empty, running init...",
            data_dir.display()
        );
        cmd::init::run()?;
    }

    match cli.command {
        None => cmd::root::run(),
        Some(Commands::Init) => cmd::init::run(),
        Some(Commands::Status) => cmd::status::run(),
        Some(Commands::Done {
            entity_id,
            date,
            yes,
        }) => cmd::done::run(&entity_id, date.as_deref(), yes),
    }
}

/// Returns true when `dir` does not exist or exists but contains no files.
fn dir_needs_init(dir: &std::path::Path) -> bool {
    if !dir.exists() {
        return true;
    }
    dir.read_dir()
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dir_needs_init_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("does_not_exist");
        assert!(dir_needs_init(&missing));
    }

    #[test]
    fn test_dir_needs_init_empty_dir() {
        let tmp = TempDir::new().unwrap();
        assert!(dir_needs_init(tmp.path()));
    }

    #[test]
    fn test_dir_needs_init_nonempty_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("file.txt"), "data").unwrap();
        assert!(!dir_needs_init(tmp.path()));
    }

    #[test]
    fn test_cli_parses_done_with_flags() {
        let cli = Cli::try_parse_from([
            "dtrack",
            "done",
            "input_datetime.filter",
            "--date",
            "2025-03-09",
            "-y",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Done {
                entity_id,
                date,
                yes,
            }) => {
                assert_eq!(entity_id, "input_datetime.filter");
                assert_eq!(date.as_deref(), Some("2025-03-09"));
                assert!(yes);
            }
            _ => panic!("expected done"),
        }
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["dtrack"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.data_dir, PathBuf::from("./config"));
        assert_eq!(cli.verbose, 0);
    }
}
