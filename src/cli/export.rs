use std::path::{Path, PathBuf};

use crate::cli::open_store;
use crate::error::Result;
use crate::export::{default_file_name, to_csv_string, write_csv};
use crate::settings::load_settings;
use crate::store::VisitStore;

fn default_path(extension: &str) -> PathBuf {
    let name = default_file_name(chrono::Local::now().date_naive());
    PathBuf::from(load_settings().data_dir)
        .join("exports")
        .join(Path::new(&name).with_extension(extension))
}

fn prepare(output: Option<String>, extension: &str) -> Result<PathBuf> {
    let path = output.map(PathBuf::from).unwrap_or_else(|| default_path(extension));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(path)
}

pub fn csv(output: Option<String>) -> Result<()> {
    let store = open_store()?;
    let entries = store.list_entries()?;
    if output.as_deref() == Some("-") {
        print!("{}", to_csv_string(&entries)?);
        return Ok(());
    }
    let path = prepare(output, "csv")?;

    let file = std::fs::File::create(&path)?;
    write_csv(&entries, file)?;
    println!("Exported {} entries to {}", entries.len(), path.display());
    Ok(())
}

#[cfg(feature = "pdf")]
pub fn pdf(output: Option<String>) -> Result<()> {
    let store = open_store()?;
    let entries = store.list_entries()?;
    let path = prepare(output, "pdf")?;

    let generated = format!("Generated {}", chrono::Local::now().format("%Y-%m-%d %H:%M"));
    let bytes = crate::pdf::render_visits(&entries, store.owner(), &generated)?;
    std::fs::write(&path, bytes)?;
    println!("Wrote {}", path.display());
    Ok(())
}
