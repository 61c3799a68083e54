//! # marquee-http - HTTP Intake
//!
//! Accepts display requests over HTTP and pushes them onto the shared
//! [`MessageQueue`](marquee_app::MessageQueue). Nothing here touches the
//! display.
//!
//! ## Public API
//! - [`build_server()`] - Bind the actix-web server
//! - [`configure()`] - Route registration, for embedding or tests
//! - [`build_request()`] - Parameter validation shared by both endpoints

pub mod intake;
pub mod routes;
pub mod server;

pub use intake::{build_request, json_params, ARGUMENT_FLAGS, MESSAGE_KEY};
pub use routes::{configure, IntakeError, IntakeState, QueueStatus, QUEUE_FULL_BODY};
pub use server::build_server;
