use serde::{Deserialize, Serialize};

/// Filesystem locations the engine reads from and writes to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding one `.md` file per memory.
    pub data_dir: String,
    /// SQLite database file path.
    pub db_path: String,
    /// Quarantine subdirectory name, created under `data_dir`.
    pub quarantine_dir_name: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home = dirs_home();
        Self {
            data_dir: format!("{home}/.reins/environments/default/memories"),
            db_path: format!("{home}/.reins/environments/default/memories.sqlite3"),
            quarantine_dir_name: ".quarantine".to_string(),
        }
    }
}

fn dirs_home() -> String {
    std::env::var("HOME").unwrap_or_else(|_| ".".to_string())
}
