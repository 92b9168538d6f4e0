use thiserror::Error;

#[derive(Error, Debug)]
pub enum MedlogError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Entry not found: {0}")]
    EntryNotFound(i64),

    #[error("You do not own entry {0}")]
    NotOwner(i64),

    #[error("Confirmation does not match hospital name '{expected}'")]
    ConfirmationMismatch { expected: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Please select a CSV file (.csv): {0}")]
    NotCsv(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("{0}")]
    Other(String),
}

impl MedlogError {
    /// Short, sanitized text suitable for showing next to a failed entry.
    pub fn user_message(&self) -> String {
        match self {
            Self::EntryNotFound(_) => "Entry not found. It may have been deleted.".to_string(),
            Self::NotOwner(_) => "You do not have permission to modify this entry.".to_string(),
            Self::ConfirmationMismatch { .. } => {
                "Confirmation failed. Please check your input and try again.".to_string()
            }
            Self::NotCsv(_) => "Please select a CSV file (.csv)".to_string(),
            Self::Validation(msg) | Self::Other(msg) if msg.len() < 200 => msg.clone(),
            Self::Db(_) => "Could not save entry. Please try again.".to_string(),
            Self::Io(_) | Self::Csv(_) | Self::Json(_) => {
                "Could not read or write the file. Please try again.".to_string()
            }
            _ => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MedlogError>;
