//! Configuration file parsing for matrix-marquee
//!
//! Supports:
//! - `/etc/matrix-marquee/config.toml` - System-wide settings
//! - `<config_dir>/matrix-marquee/config.toml` - Per-user settings
//! - Any file named with `--config`

pub mod settings;
pub mod types;

pub use settings::{
    config_search_paths, init_config_file, load_settings, load_settings_from, user_config_path,
    validate, DEFAULT_CONFIG,
};
pub use types::*;
