use crate::error::{MedlogError, Result};
use crate::settings::{load_settings, save_settings};

pub fn show() -> Result<()> {
    let settings = load_settings();
    if settings.user_name.trim().is_empty() {
        println!("Profile: {} (default)", settings.owner());
    } else {
        println!("Profile: {}", settings.owner());
    }
    Ok(())
}

pub fn set(name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MedlogError::Validation("Profile name cannot be empty".into()));
    }
    let mut settings = load_settings();
    settings.user_name = name.to_string();
    save_settings(&settings)?;
    println!("Profile set to {name}");
    Ok(())
}
