//! Hardware and filesystem settings used to build render command lines
//!
//! These are deserialized as the `[render]` section of the application
//! settings file, but live here because only the command builders read them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything the render backend needs to know about the installation
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub paths: RenderPaths,

    #[serde(default)]
    pub hardware: HardwareConfig,
}

/// Locations of the renderer executables, the font, and the video library
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RenderPaths {
    /// Directory holding `sort`, `mandelbrot`, `choochoo`, `demo` and
    /// `scrolling-text-example`
    #[serde(default = "default_examples_dir")]
    pub examples_dir: PathBuf,

    /// The video player executable
    #[serde(default = "default_video_viewer")]
    pub video_viewer: PathBuf,

    /// BDF font used for text messages
    #[serde(default = "default_font")]
    pub font: PathBuf,

    /// Directory scanned for video files
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,

    /// Accepted video file extensions, without the dot
    #[serde(default = "default_media_extensions")]
    pub media_extensions: Vec<String>,
}

impl Default for RenderPaths {
    fn default() -> Self {
        Self {
            examples_dir: default_examples_dir(),
            video_viewer: default_video_viewer(),
            font: default_font(),
            media_dir: default_media_dir(),
            media_extensions: default_media_extensions(),
        }
    }
}

fn default_examples_dir() -> PathBuf {
    PathBuf::from("/home/pi/rpi-rgb-led-matrix/examples-api-use")
}

fn default_video_viewer() -> PathBuf {
    PathBuf::from("/home/pi/rpi-rgb-led-matrix/utils/video-viewer")
}

fn default_font() -> PathBuf {
    PathBuf::from("/home/pi/rpi-rgb-led-matrix/fonts/spleen-16x32.bdf")
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("/home/pi/boss_videos")
}

fn default_media_extensions() -> Vec<String> {
    vec!["mp4".to_string(), "gif".to_string(), "webm".to_string()]
}

/// LED panel geometry and driver flags shared by every renderer
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HardwareConfig {
    #[serde(default = "default_rows")]
    pub rows: u32,

    #[serde(default = "default_cols")]
    pub cols: u32,

    /// Number of daisy-chained panels
    #[serde(default = "default_chain")]
    pub chain: u32,

    #[serde(default = "default_gpio_mapping")]
    pub gpio_mapping: String,

    #[serde(default = "default_slowdown_gpio")]
    pub slowdown_gpio: u32,

    /// Show the refresh rate on the terminal of the renderer
    #[serde(default = "default_show_refresh")]
    pub show_refresh: bool,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            chain: default_chain(),
            gpio_mapping: default_gpio_mapping(),
            slowdown_gpio: default_slowdown_gpio(),
            show_refresh: default_show_refresh(),
        }
    }
}

fn default_rows() -> u32 {
    32
}

fn default_cols() -> u32 {
    64
}

fn default_chain() -> u32 {
    3
}

fn default_gpio_mapping() -> String {
    "adafruit-hat-pwm".to_string()
}

fn default_slowdown_gpio() -> u32 {
    15
}

fn default_show_refresh() -> bool {
    true
}

impl HardwareConfig {
    /// The `--led-*` flags passed to every renderer, in a fixed order
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--led-rows={}", self.rows),
            format!("--led-cols={}", self.cols),
            format!("--led-chain={}", self.chain),
            format!("--led-gpio-mapping={}", self.gpio_mapping),
            format!("--led-slowdown-gpio={}", self.slowdown_gpio),
        ];
        if self.show_refresh {
            args.push("--led-show-refresh".to_string());
        }
        args
    }
}
