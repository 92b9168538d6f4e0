use crate::db::{get_connection, get_metadata};
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::{load_settings, settings_file_exists};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("Profile:    {}", settings.owner());
    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    if !settings_file_exists() {
        println!("Settings:   (defaults, no settings file)");
    }

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let schema = get_metadata(&conn, "schema_version");
        println!("Schema:     {}", schema.as_deref().unwrap_or("(unknown)"));

        let owner = settings.owner();
        let mine: i64 = conn.query_row(
            "SELECT count(*) FROM visit_entries WHERE owner = ?1",
            [owner],
            |r| r.get(0),
        )?;
        let all: i64 = conn.query_row("SELECT count(*) FROM visit_entries", [], |r| r.get(0))?;
        let imports: i64 = conn.query_row(
            "SELECT count(*) FROM imports WHERE owner = ?1",
            [owner],
            |r| r.get(0),
        )?;

        println!();
        println!("Your entries:  {mine}");
        println!("All entries:   {all}");
        println!("Imports:       {imports}");
    } else {
        println!();
        println!("Database not found. Run `medlog init` to set up.");
    }

    Ok(())
}
