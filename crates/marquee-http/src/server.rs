//! The intake HTTP server

use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};

use marquee_core::prelude::*;

use crate::routes::{configure, IntakeState};

/// Bind the intake server.
///
/// The returned [`Server`] must be awaited (or spawned) to serve requests.
/// OS signals are left to the caller, which stops the server through
/// [`Server::handle`].
pub fn build_server(bind: &str, workers: usize, state: IntakeState) -> Result<Server> {
    let data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(data.clone())
            .configure(configure)
    })
    .workers(workers.max(1))
    .disable_signals()
    .bind(bind)
    .map_err(|e| Error::server(format!("Failed to bind {}: {}", bind, e)))?
    .run();

    info!("Listening on http://{}", bind);
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_app::MessageQueue;
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_bind_failure_is_server_error() {
        let state = IntakeState::new(Arc::new(MessageQueue::default()), 250);
        let err = build_server("not-an-address", 1, state).err().unwrap();
        assert!(matches!(err, Error::Server { .. }));
        assert!(err.is_fatal());
    }

    #[actix_web::test]
    async fn test_server_starts_and_stops() {
        let state = IntakeState::new(Arc::new(MessageQueue::default()), 250);
        let server = build_server("127.0.0.1:0", 1, state).unwrap();
        let handle = server.handle();
        let running = actix_web::rt::spawn(server);

        handle.stop(true).await;
        running.await.unwrap().unwrap();
    }
}
