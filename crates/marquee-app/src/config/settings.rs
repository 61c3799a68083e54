//! Settings loading, validation and the default config file

use std::path::{Path, PathBuf};

use marquee_core::prelude::*;

use super::types::Settings;

const CONFIG_FILENAME: &str = "config.toml";
const APP_DIR: &str = "matrix-marquee";
const SYSTEM_CONFIG_DIR: &str = "/etc/matrix-marquee";

/// Places searched for a settings file when none is named, in order
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG_DIR).join(CONFIG_FILENAME)];
    if let Some(dir) = user_config_path() {
        paths.push(dir);
    }
    paths
}

/// `<config_dir>/matrix-marquee/config.toml`, if the platform has one
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILENAME))
}

/// Load settings.
///
/// An `explicit` path must exist and parse. Without one, the first existing
/// file from [`config_search_paths`] is used; if it cannot be read or
/// parsed the defaults are used instead. The result is validated either way.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    load_settings_from(explicit, &config_search_paths())
}

/// [`load_settings`] with a custom search list
pub fn load_settings_from(explicit: Option<&Path>, search: &[PathBuf]) -> Result<Settings> {
    let settings = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::ConfigNotFound {
                    path: path.to_path_buf(),
                });
            }
            let content = std::fs::read_to_string(path)
                .map_err(|e| Error::config_invalid(format!("{}: {}", path.display(), e)))?;
            let settings = parse_settings(&content)
                .map_err(|e| Error::config_invalid(format!("{}: {}", path.display(), e)))?;
            info!("Loaded settings from {:?}", path);
            settings
        }
        None => discover_settings(search),
    };

    validate(&settings)?;
    Ok(settings)
}

fn discover_settings(search: &[PathBuf]) -> Settings {
    let Some(config_path) = search.iter().find(|p| p.exists()) else {
        debug!("No config file in {:?}, using defaults", search);
        return Settings::default();
    };

    match std::fs::read_to_string(config_path) {
        Ok(content) => match parse_settings(&content) {
            Ok(settings) => {
                info!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

fn parse_settings(content: &str) -> std::result::Result<Settings, toml::de::Error> {
    toml::from_str(content)
}

/// Reject settings the arbiter or intake cannot run with
pub fn validate(settings: &Settings) -> Result<()> {
    let hw = &settings.render.hardware;
    let schedule = &settings.schedule;

    let problem = if settings.queue.capacity == 0 {
        Some("queue.capacity must be at least 1")
    } else if settings.queue.max_message_chars == 0 {
        Some("queue.max_message_chars must be at least 1")
    } else if settings.server.workers == 0 {
        Some("server.workers must be at least 1")
    } else if schedule.tick_ms < 10 {
        Some("schedule.tick_ms must be at least 10")
    } else if schedule.demo_timeout_secs == 0 {
        Some("schedule.demo_timeout_secs must be at least 1")
    } else if schedule.demo_attempts == 0 {
        Some("schedule.demo_attempts must be at least 1")
    } else if schedule.backoff_initial_ms == 0 {
        Some("schedule.backoff_initial_ms must be at least 1")
    } else if schedule.backoff_max_secs.saturating_mul(1000) < schedule.backoff_initial_ms {
        Some("schedule.backoff_max_secs must not be below schedule.backoff_initial_ms")
    } else if schedule.terminate_timeout_ms == 0 {
        Some("schedule.terminate_timeout_ms must be at least 1")
    } else if hw.rows == 0 || hw.cols == 0 || hw.chain == 0 {
        Some("render.hardware rows, cols and chain must be at least 1")
    } else if settings.render.paths.media_extensions.is_empty() {
        Some("render.paths.media_extensions must not be empty")
    } else {
        None
    };

    match problem {
        Some(message) => Err(Error::config_invalid(message)),
        None => Ok(()),
    }
}

/// Commented default settings file
pub const DEFAULT_CONFIG: &str = r#"# matrix-marquee configuration
# Every key is optional; the values below are the built-in defaults.

[server]
bind = "0.0.0.0:8080"
workers = 1

[queue]
capacity = 10              # requests waiting for the display
max_message_chars = 250    # longer messages are cut

[schedule]
tick_ms = 1000             # arbitration cadence
demo_timeout_secs = 30     # a demo is replaced after this long
demo_attempts = 6          # demo selections tried before backing off
backoff_initial_ms = 1000
backoff_max_secs = 60
terminate_timeout_ms = 2000

[render.paths]
examples_dir = "/home/pi/rpi-rgb-led-matrix/examples-api-use"
video_viewer = "/home/pi/rpi-rgb-led-matrix/utils/video-viewer"
font = "/home/pi/rpi-rgb-led-matrix/fonts/spleen-16x32.bdf"
media_dir = "/home/pi/boss_videos"
media_extensions = ["mp4", "gif", "webm"]

[render.hardware]
rows = 32
cols = 64
chain = 3
gpio_mapping = "adafruit-hat-pwm"
slowdown_gpio = 15
show_refresh = true

[logging]
# directory = "/var/log/matrix-marquee"
"#;

/// Write [`DEFAULT_CONFIG`] to `path` (or the user config path).
///
/// Refuses to overwrite an existing file. Returns the path written.
pub fn init_config_file(path: Option<&Path>) -> Result<PathBuf> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => user_config_path()
            .ok_or_else(|| Error::config("No user config directory on this platform"))?,
    };

    if config_path.exists() {
        return Err(Error::config(format!(
            "{} already exists, not overwriting",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::config(format!("Failed to create {:?}: {}", parent, e)))?;
        }
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .map_err(|e| Error::config(format!("Failed to write {:?}: {}", config_path, e)))?;

    info!("Wrote default settings to {:?}", config_path);
    Ok(config_path)
}
