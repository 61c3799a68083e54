//! # marquee-app - Queue, Arbitration and Settings
//!
//! Owns the bounded message queue and the arbitration state machine that
//! decides what the LED matrix shows, plus settings loading and the
//! [`Engine`] that ties them together.
//!
//! ## Public API
//!
//! - [`MessageQueue`] - Bounded FIFO shared with the HTTP intake
//! - [`Arbiter`] - DEMO_RUNNING / TEXT_DRAINING state machine
//! - [`Engine`] - Spawns the arbiter and coordinates shutdown
//! - [`config`] - Settings file types, loading and validation
//! - [`signals`] - SIGINT / SIGTERM, the trigger for clearing the display

pub mod arbiter;
pub mod config;
pub mod engine;
pub mod queue;
pub mod signals;

pub use arbiter::{Arbiter, ArbiterSettings};
pub use config::{load_settings, Settings};
pub use engine::{Engine, SHUTDOWN_TIMEOUT};
pub use queue::{MessageQueue, DEFAULT_QUEUE_CAPACITY};
