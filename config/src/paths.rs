use std::path::PathBuf;
use std::sync::OnceLock;

const APP_DIR_NAME: &str = "bsky-actions";

static DATA_DIR_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

pub struct PathManager;

impl PathManager {
    /// Set a custom data directory (useful for Android/iOS where standard detection fails)
    pub fn set_data_dir(path: PathBuf) {
        let _ = DATA_DIR_OVERRIDE.set(path);
    }

    pub fn data_dir() -> Option<PathBuf> {
        if let Some(d) = DATA_DIR_OVERRIDE.get() {
            return Some(d.clone());
        }
        dirs::data_dir().map(|d| d.join(APP_DIR_NAME))
    }

    pub fn config_dir() -> Option<PathBuf> {
        // An overridden data dir also holds the config on mobile targets
        if DATA_DIR_OVERRIDE.get().is_some() {
            return Self::data_dir();
        }
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME))
    }

    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("settings.toml"))
    }

    pub fn logs_dir() -> Option<PathBuf> {
        Self::data_dir().map(|d| d.join("logs"))
    }

    pub fn log_file_path() -> Option<PathBuf> {
        Self::logs_dir().map(|d| d.join("bsky-actions.log"))
    }

    pub fn ensure_dirs_exist() -> std::io::Result<()> {
        if let Some(d) = Self::data_dir() {
            std::fs::create_dir_all(&d)?;
        }
        if let Some(d) = Self::config_dir() {
            std::fs::create_dir_all(&d)?;
        }
        if let Some(d) = Self::logs_dir() {
            std::fs::create_dir_all(&d)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_paths_share_the_data_dir() {
        let Some(data) = PathManager::data_dir() else {
            return;
        };
        let log = PathManager::log_file_path().unwrap();
        assert!(log.starts_with(&data));
        assert_eq!(log.file_name().unwrap(), "bsky-actions.log");
    }

    #[test]
    fn test_settings_path_is_toml() {
        if let Some(path) = PathManager::settings_path() {
            assert_eq!(path.extension().unwrap(), "toml");
        }
    }
}
