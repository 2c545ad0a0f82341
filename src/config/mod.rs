// Configuration management module
// TOML settings on disk plus one-shot provider credential resolution

pub mod credentials;
pub mod interactive;
pub mod settings;


pub use credentials::{Provider, ResolvedProviders};
pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    Config, ConfigError, IndexConfig, ProviderConfig, ProviderKind, RetrievalConfig,
};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::config_dir()
}
