//! Errors raised while loading a record table.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    /// Required column(s) absent from the header row. Nothing is rendered.
    #[error("Missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Malformed CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read data file: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    pub fn missing_columns(&self) -> &[String] {
        match self {
            LoadError::Schema { missing } => missing,
            _ => &[],
        }
    }
}
