use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "formcoach";

/// Where formcoach keeps files that are not configuration
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/formcoach`, or the platform data dir without a HOME
    pub fn state_dir() -> Option<PathBuf> {
        match std::env::var_os("HOME") {
            Some(home) => Some(PathBuf::from(home).join(".local/state").join(APP_NAME)),
            None => ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_local_dir().to_path_buf()),
        }
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join(format!("{APP_NAME}.log")))
    }
}
