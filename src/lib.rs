//! matrix-marquee library
//!
//! Wires the HTTP intake, the arbitration engine and the renderer backend
//! into one service.

pub mod runner;

// Re-export main entry points
pub use runner::{run, serve};
