pub mod paths;
pub mod settings;

pub use paths::PathManager;
pub use settings::Settings;

use std::path::Path;

/// Load environment variables from .env files.
/// First loads from ./.env (project directory), then from ~/.env (home directory).
/// Values already present in the environment are never overwritten, so the
/// home file only fills in what the project file and the shell left unset.
pub fn load_env_file() {
    let project = std::env::current_dir().ok().map(|d| d.join(".env"));
    let home = dirs::home_dir().map(|d| d.join(".env"));
    load_env_files(project.as_deref(), home.as_deref());
}

/// Loads the project file, then the home file. Missing files are skipped.
pub fn load_env_files(project: Option<&Path>, home: Option<&Path>) {
    for path in [project, home].into_iter().flatten() {
        dotenv::from_path(path).ok();
    }
}
