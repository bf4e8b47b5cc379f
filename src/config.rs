use std::path::PathBuf;

pub const DEFAULT_ZOOM_LEVEL: u8 = 13;
pub const DEFAULT_STORAGE_KEY: &str = "workouts";
pub const DEFAULT_DB_PATH: &str = "mapty.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Zoom used when the map centers on a location.
    pub zoom_level: u8,
    /// Key the workout snapshot lives under.
    pub storage_key: String,
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            zoom_level: DEFAULT_ZOOM_LEVEL,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}
