//! # marquee-daemon - Render Process Management
//!
//! Builds renderer command lines, picks ambient demos, and supervises the
//! single child process that drives the LED matrix.
//!
//! Depends on [`marquee_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Backend
//! - [`RenderBackend`] - start demo / run text / terminate / poll capability
//! - [`ProcessBackend`] - Backend that runs the real renderer executables
//!
//! ### Process Management
//! - [`RenderProcess`] - Spawn and supervise one renderer child process
//!
//! ### Command Lines
//! - [`RenderCommand`] - Program plus argv
//! - [`demo_command()`], [`text_command()`] - Per-job command builders
//! - [`RenderConfig`] - Hardware flags and install paths
//!
//! ### Demo Selection
//! - [`select_demo()`] - Weighted random demo choice
//! - [`list_media()`] - Video discovery

pub mod backend;
pub mod command;
pub mod config;
pub mod demos;
pub mod process;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

// Public API re-exports
pub use backend::{LocalRenderBackend, ProcessBackend, RenderBackend, DEFAULT_TERMINATE_GRACE};
pub use command::{demo_command, text_command, RenderCommand};
pub use config::{HardwareConfig, RenderConfig, RenderPaths};
pub use demos::{build_demo, choose_category, list_media, select_demo, NUMBERED_DEMO_POOL};
pub use process::RenderProcess;
