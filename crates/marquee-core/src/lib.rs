//! # marquee-core - Core Domain Types
//!
//! Foundation crate for matrix-marquee. Provides domain types, error
//! handling, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on
//! external crates (thiserror, tracing, tracing-subscriber,
//! tracing-appender, dirs).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`DisplayRequest`] - A queued user message plus renderer flags
//! - [`TextJob`], [`DemoJob`] - Render jobs handed to a backend
//! - [`DemoCategory`], [`SortAlgorithm`] - Demo selection vocabulary
//! - [`ProcessStatus`] - Non-blocking render process status
//! - [`DisplayState`] - Arbiter state (demo vs. text)
//! - [`escape_text()`] - Argument escaping for message text
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Error enum with client / recoverable / fatal classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use marquee_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod types;

/// Prelude for common imports used throughout all matrix-marquee crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

pub use error::{Error, Result, ResultExt};
pub use types::{
    escape_text, truncate_chars, DemoCategory, DemoJob, DisplayRequest, DisplayState,
    ProcessStatus, SortAlgorithm, TextJob, MAX_MESSAGE_CHARS,
};
