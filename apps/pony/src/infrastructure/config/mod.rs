//! Configuration Module
//!
//! Environment-driven configuration and `.env` loading.

mod settings;

pub use settings::{
    AppConfig, BrokerKind, ConfigError, Credentials, Environment, HttpSettings,
};

/// Load a `.env` file from the current directory or its ancestors.
///
/// Returns the path that was loaded, if any. A missing file is not an error.
pub fn load_dotenv() -> Option<std::path::PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .map(|dir| dir.join(".env"))
        .find(|candidate| candidate.is_file())
        .and_then(|path| dotenvy::from_path(&path).ok().map(|()| path))
}
