//! End-to-end flow: HTTP intake -> queue -> arbiter -> render backend
//!
//! Uses the scripted `FakeBackend` in place of the renderer executables.

use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::json;
use tempfile::tempdir;

use marquee_app::{config, Engine, Settings};
use marquee_core::Error;
use marquee_daemon::test_utils::{FakeBackend, FakeController, FakeEvent};
use marquee_http::{configure, IntakeState};

fn fast_settings() -> Settings {
    let mut settings = Settings::default();
    settings.schedule.tick_ms = 10;
    settings
}

async fn wait_until(what: &str, mut done: impl FnMut() -> bool) {
    for _ in 0..300 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {}", what);
}

fn text(s: &str) -> String {
    s.to_string()
}

async fn start(backend: FakeBackend) -> (Engine, FakeController) {
    let ctl = backend.controller();
    let engine = Engine::start(fast_settings(), backend);
    wait_until("first demo", || ctl.demos_started() == 1).await;
    (engine, ctl)
}

#[actix_web::test]
async fn test_message_interrupts_demo_and_demo_resumes() {
    let (mut engine, ctl) = start(FakeBackend::new()).await;
    let state = web::Data::new(IntakeState::new(engine.queue(), 250));
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/sendText?message=HELLO&speed=5")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    wait_until("demo restart", || ctl.demos_started() == 2).await;
    assert_eq!(
        ctl.events(),
        vec![
            FakeEvent::DemoStarted(1),
            FakeEvent::Terminated(1),
            FakeEvent::TextStarted(text("HELLO")),
            FakeEvent::TextFinished(text("HELLO")),
            FakeEvent::DemoStarted(2),
        ]
    );

    engine.shutdown().await;
    assert_eq!(ctl.live_demo(), None);
}

#[actix_web::test]
async fn test_burst_from_both_endpoints_renders_in_order() {
    let backend = FakeBackend::new().with_text_duration(Duration::from_millis(200));
    let (mut engine, ctl) = start(backend).await;
    let state = web::Data::new(IntakeState::new(engine.queue(), 250));
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;

    let first = test::TestRequest::post()
        .uri("/sendText?message=one")
        .to_request();
    assert_eq!(test::call_service(&app, first).await.status(), StatusCode::OK);
    wait_until("first text", || {
        ctl.events().contains(&FakeEvent::TextStarted(text("one")))
    })
    .await;

    // both arrive while "one" is still on the display
    let second = test::TestRequest::post()
        .uri("/json")
        .set_json(json!({"message": "two", "color": "255,0,0"}))
        .to_request();
    assert_eq!(test::call_service(&app, second).await.status(), StatusCode::OK);
    let third = test::TestRequest::post()
        .uri("/sendText?message=three")
        .to_request();
    assert_eq!(test::call_service(&app, third).await.status(), StatusCode::OK);

    wait_until("all texts", || ctl.finished_texts().len() == 3).await;
    assert_eq!(ctl.finished_texts(), vec!["one", "two", "three"]);

    let events = ctl.events();
    let first_text = events
        .iter()
        .position(|e| matches!(e, FakeEvent::TextStarted(_)))
        .unwrap();
    let last_text = events
        .iter()
        .rposition(|e| matches!(e, FakeEvent::TextFinished(_)))
        .unwrap();
    assert!(!events[first_text..=last_text]
        .iter()
        .any(|e| matches!(e, FakeEvent::DemoStarted(_))));

    engine.shutdown().await;
}

#[actix_web::test]
async fn test_rejected_requests_never_reach_display() {
    let (mut engine, ctl) = start(FakeBackend::new()).await;
    let state = web::Data::new(IntakeState::new(engine.queue(), 250));
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/sendText?message=hi&unknownkey=5")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(ctl.finished_texts().is_empty());
    assert_eq!(ctl.live_demo(), Some(1));

    engine.shutdown().await;
}

#[actix_web::test]
async fn test_serve_runs_until_shutdown() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(
        &path,
        "[server]\nbind = \"127.0.0.1:0\"\n\n[schedule]\ntick_ms = 10\n",
    )
    .unwrap();
    let settings = config::load_settings(Some(&path)).unwrap();

    let backend = FakeBackend::new();
    let ctl = backend.controller();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let serving = matrix_marquee::serve(settings, backend, async move {
        let _ = rx.await;
        Ok(())
    });
    let driver = async {
        wait_until("first demo", || ctl.demos_started() == 1).await;
        tx.send(()).unwrap();
    };

    let (result, ()) = tokio::join!(serving, driver);
    result.unwrap();
    assert_eq!(ctl.live_demo(), None);
}

#[actix_web::test]
async fn test_serve_bind_failure_clears_display() {
    let mut settings = fast_settings();
    settings.server.bind = "not-an-address".to_string();

    let backend = FakeBackend::new();
    let ctl = backend.controller();
    let result = matrix_marquee::serve(settings, backend, std::future::pending()).await;

    assert!(matches!(result, Err(Error::Server { .. })));
    assert_eq!(ctl.live_demo(), None);
}
