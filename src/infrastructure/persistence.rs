use crate::domain::History;
use log::warn;
use std::fs;

pub struct HistoryRepository;

impl HistoryRepository {
    /// Writes the history, newest first, as pretty-printed JSON and returns
    /// the filename written.
    pub fn export_history(history: &History, filename: &str) -> Result<String, String> {
        match serde_json::to_string_pretty(history.entries()) {
            Ok(json) => {
                match fs::write(filename, &json) {
                    Ok(_) => Ok(filename.to_string()),
                    Err(e) => {
                        warn!("could not write history to {}: {}", filename, e);
                        Err(e.to_string())
                    }
                }
            }
            Err(e) => Err(format!("Serialization failed: {}", e)),
        }
    }
}
