pub mod analytics;
pub mod backup;
pub mod entries;
pub mod export;
pub mod import;
pub mod init;
pub mod profile;
pub mod status;

use clap::{Parser, Subcommand};

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::load_settings;
use crate::store::SqliteStore;

/// Open the configured database as the current profile's store.
pub(crate) fn open_store() -> Result<SqliteStore> {
    let settings = load_settings();
    std::fs::create_dir_all(&settings.data_dir)?;
    let conn = get_connection(&settings.db_path())?;
    init_db(&conn)?;
    Ok(SqliteStore::new(conn, settings.owner()))
}

#[derive(Parser)]
#[command(name = "medlog", about = "Personal medical-expense record keeper.")]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Entry fields shared by `add` and `edit`.
#[derive(clap::Args, Debug, Default)]
pub struct EntryArgs {
    /// Hospital name
    #[arg(long)]
    pub hospital: Option<String>,
    /// Visit date: YYYY-MM-DD, MM/DD/YYYY or DD/MM/YYYY
    #[arg(long)]
    pub date: Option<String>,
    /// Doctor name
    #[arg(long)]
    pub doctor: Option<String>,
    /// Patient name
    #[arg(long)]
    pub patient: Option<String>,
    /// Hospital charges in whole rupees
    #[arg(long = "hospital-rs")]
    pub hospital_rs: Option<String>,
    /// Medicine charges in whole rupees
    #[arg(long = "medicine-rs")]
    pub medicine_rs: Option<String>,
    /// Medicine name
    #[arg(long)]
    pub medicine: Option<String>,
    /// Address
    #[arg(long)]
    pub address: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up medlog: choose a data directory and initialize the database.
    Init {
        /// Path for medlog data (default: ~/Documents/medlog)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Profile name to record entries under
        #[arg(long)]
        name: Option<String>,
    },
    /// Show or change the profile entries are recorded under.
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Record a new visit entry.
    Add {
        #[command(flatten)]
        entry: EntryArgs,
    },
    /// Change fields of an existing entry.
    Edit {
        /// Entry ID (shown in `medlog list`)
        id: i64,
        #[command(flatten)]
        entry: EntryArgs,
    },
    /// Delete an entry. The hospital name must be typed to confirm.
    Delete {
        /// Entry ID (shown in `medlog list`)
        id: i64,
        /// Hospital name of the entry, exactly as stored
        #[arg(long)]
        confirm: String,
    },
    /// List all entries, newest visit first.
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show a single entry.
    Show {
        /// Entry ID
        id: i64,
    },
    /// Import visit entries from a CSV file.
    Import {
        /// Path to the CSV file
        file: String,
        /// Only validate and preview; do not save anything
        #[arg(long = "dry-run")]
        dry_run: bool,
        /// Print the parse result as JSON and stop (implies --dry-run)
        #[arg(long)]
        json: bool,
        /// Import even if this exact file was imported before
        #[arg(long)]
        force: bool,
    },
    /// Export entries to CSV or PDF.
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// Spending analytics.
    Analytics {
        #[command(subcommand)]
        command: AnalyticsCommands,
    },
    /// Show current database and summary statistics.
    Status,
    /// Back up the database.
    Backup {
        /// Output path (default: <data_dir>/backups/medlog-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
    /// Print a shell completion script.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the current profile.
    Show,
    /// Set the profile name.
    Set {
        name: String,
    },
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export entries to a CSV file that `medlog import` can read back.
    Csv {
        /// Output file path, or `-` for stdout (default: <data_dir>/exports/hospital-visits-YYYY-MM-DD.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Export the visit register to PDF.
    #[cfg(feature = "pdf")]
    Pdf {
        /// Output file path (default: <data_dir>/exports/hospital-visits-YYYY-MM-DD.pdf)
        #[arg(long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AnalyticsCommands {
    /// Totals per month.
    Monthly {
        #[arg(long)]
        json: bool,
    },
    /// Totals per year.
    Yearly {
        #[arg(long)]
        json: bool,
    },
    /// Totals across every entry.
    Summary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_import_flags() {
        let cli = Cli::parse_from(["medlog", "import", "visits.csv", "--dry-run"]);
        match cli.command {
            Commands::Import { file, dry_run, json, force } => {
                assert_eq!(file, "visits.csv");
                assert!(dry_run);
                assert!(!json && !force);
            }
            _ => panic!("expected import"),
        }
    }

    #[test]
    fn test_parse_add_fields() {
        let cli = Cli::parse_from([
            "medlog", "add", "--hospital", "City", "--hospital-rs", "10", "--date", "2024-01-15",
        ]);
        match cli.command {
            Commands::Add { entry } => {
                assert_eq!(entry.hospital.as_deref(), Some("City"));
                assert_eq!(entry.hospital_rs.as_deref(), Some("10"));
                assert!(entry.doctor.is_none());
            }
            _ => panic!("expected add"),
        }
    }
}
