//! Service lifecycle: start the engine, serve HTTP, shut down cleanly

use std::future::Future;

use marquee_app::{signals, Engine, Settings};
use marquee_core::prelude::*;
use marquee_daemon::{ProcessBackend, RenderBackend};
use marquee_http::{build_server, IntakeState};

/// Drive the real renderer executables until SIGINT or SIGTERM
pub async fn run(settings: Settings) -> Result<()> {
    let backend = ProcessBackend::new(settings.render.clone())
        .with_terminate_grace(settings.schedule.terminate_timeout());
    let shutdown = async { signals::shutdown_signal().await.map(|_| ()) };
    serve(settings, backend, shutdown).await
}

/// Serve HTTP intake over `backend` until `shutdown` resolves or the
/// server fails, then stop the server and clear the display.
pub async fn serve<B, F>(settings: Settings, backend: B, shutdown: F) -> Result<()>
where
    B: RenderBackend + Send + 'static,
    F: Future<Output = Result<()>>,
{
    info!("matrix-marquee {}", env!("CARGO_PKG_VERSION"));

    let bind = settings.server.bind.clone();
    let workers = settings.server.workers;
    let max_message_chars = settings.queue.max_message_chars;

    let mut engine = Engine::start(settings, backend);
    let state = IntakeState::new(engine.queue(), max_message_chars);

    let server = match build_server(&bind, workers, state) {
        Ok(server) => server,
        Err(e) => {
            engine.shutdown().await;
            return Err(e);
        }
    };
    let handle = server.handle();
    tokio::pin!(server);

    let result = tokio::select! {
        res = &mut server => {
            res.map_err(|e| Error::server(format!("HTTP server stopped: {}", e)))
        }
        res = shutdown => {
            info!("Stopping HTTP server");
            handle.stop(true).await;
            if let Err(e) = server.await {
                warn!("HTTP server ended with error: {}", e);
            }
            res
        }
    };

    engine.shutdown().await;
    info!("matrix-marquee stopped");
    result
}
