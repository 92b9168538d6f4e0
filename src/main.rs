mod analytics;
mod cli;
mod db;
mod error;
mod export;
mod fmt;
mod form;
mod importer;
mod models;
#[cfg(feature = "pdf")]
mod pdf;
mod settings;
mod store;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{fmt as log_fmt, prelude::*, EnvFilter};

use cli::{AnalyticsCommands, Cli, Commands, ExportCommands, ProfileCommands};

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("medlog=debug")
    } else {
        EnvFilter::try_from_env("MEDLOG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(log_fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init { data_dir, name } => cli::init::run(data_dir, name),
        Commands::Profile { command } => match command {
            ProfileCommands::Show => cli::profile::show(),
            ProfileCommands::Set { name } => cli::profile::set(&name),
        },
        Commands::Add { entry } => cli::entries::add(entry),
        Commands::Edit { id, entry } => cli::entries::edit(id, entry),
        Commands::Delete { id, confirm } => cli::entries::delete(id, &confirm),
        Commands::List { json } => cli::entries::list(json),
        Commands::Show { id } => cli::entries::show(id),
        Commands::Import {
            file,
            dry_run,
            json,
            force,
        } => cli::import::run(&file, dry_run, json, force),
        Commands::Export { command } => match command {
            ExportCommands::Csv { output } => cli::export::csv(output),
            #[cfg(feature = "pdf")]
            ExportCommands::Pdf { output } => cli::export::pdf(output),
        },
        Commands::Analytics { command } => match command {
            AnalyticsCommands::Monthly { json } => cli::analytics::monthly(json),
            AnalyticsCommands::Yearly { json } => cli::analytics::yearly(json),
            AnalyticsCommands::Summary => cli::analytics::summary(),
        },
        Commands::Status => cli::status::run(),
        Commands::Backup { output } => cli::backup::run(output),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "medlog", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
