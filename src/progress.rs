use crate::error::EtlError;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

pub const TIMESTAMP_FORMAT: &str = "%Y-%b-%d-%H:%M:%S";
const BANNER_RULE: &str = "------------------------------------------------";

#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn record(&self, message: &str) -> Result<(), EtlError> {
        let log_err = |source| EtlError::ProgressLog {
            path: self.path.clone(),
            source,
        };

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let is_new = !self.path.exists();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(log_err)?;

        let mut text = String::new();
        if is_new {
            text.push_str(&format!(
                "{BANNER_RULE}\n{timestamp} : Initializing New Log File\n{BANNER_RULE}\n"
            ));
        }
        text.push_str(&format_line(&timestamp, message));
        file.write_all(text.as_bytes()).map_err(log_err)?;

        info!("{message}");
        Ok(())
    }
}

fn format_line(timestamp: &str, message: &str) -> String {
    format!("{timestamp} : {message}\n")
}
