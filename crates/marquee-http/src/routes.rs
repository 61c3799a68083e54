//! HTTP handlers
//!
//! - `POST /sendText?message=..&speed=..` - query-string intake
//! - `POST /json` - JSON object intake, same keys
//! - `GET /status` - queue fill level

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{error, get, post, web, HttpRequest, HttpResponse, Responder, ResponseError};
use serde::Serialize;

use marquee_app::MessageQueue;
use marquee_core::prelude::*;

use crate::intake::{build_request, json_params};

/// Body returned when the queue is at capacity
pub const QUEUE_FULL_BODY: &str = "Too many messages";

/// Shared handler state
#[derive(Debug, Clone)]
pub struct IntakeState {
    queue: Arc<MessageQueue>,
    max_message_chars: usize,
}

impl IntakeState {
    pub fn new(queue: Arc<MessageQueue>, max_message_chars: usize) -> Self {
        Self {
            queue,
            max_message_chars,
        }
    }
}

/// Intake failure rendered as an HTTP response
#[derive(Debug)]
pub struct IntakeError(pub Error);

impl std::fmt::Display for IntakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Error> for IntakeError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl ResponseError for IntakeError {
    fn status_code(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self.0 {
            Error::QueueFull { .. } => QUEUE_FULL_BODY.to_string(),
            ref other => other.to_string(),
        };
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(body)
    }
}

/// Queue fill level
#[derive(Debug, Serialize)]
pub struct QueueStatus {
    pub queued: usize,
    pub capacity: usize,
}

fn accept(state: &IntakeState, params: Vec<(String, String)>) -> Result<()> {
    let request = build_request(params, state.max_message_chars)?;
    let chars = request.text().chars().count();
    match state.queue.enqueue(request) {
        Ok(()) => {
            info!(
                "Queued message ({} chars, {}/{})",
                chars,
                state.queue.len(),
                state.queue.capacity()
            );
            Ok(())
        }
        Err(e) => {
            warn!("Rejected message: {}", e);
            Err(e)
        }
    }
}

#[post("/sendText")]
async fn send_text(
    state: web::Data<IntakeState>,
    query: web::Query<Vec<(String, String)>>,
) -> std::result::Result<HttpResponse, IntakeError> {
    accept(&state, query.into_inner())?;
    Ok(HttpResponse::Ok().finish())
}

#[post("/json")]
async fn send_json(
    state: web::Data<IntakeState>,
    body: web::Json<serde_json::Map<String, serde_json::Value>>,
) -> std::result::Result<HttpResponse, IntakeError> {
    let params = json_params(body.into_inner())?;
    accept(&state, params)?;
    Ok(HttpResponse::Ok().finish())
}

#[get("/status")]
async fn status(state: web::Data<IntakeState>) -> impl Responder {
    web::Json(QueueStatus {
        queued: state.queue.len(),
        capacity: state.queue.capacity(),
    })
}

fn bad_request(message: String) -> error::Error {
    let response = HttpResponse::BadRequest()
        .content_type("text/plain; charset=utf-8")
        .body(message.clone());
    error::InternalError::from_response(message, response).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> error::Error {
    debug!("Bad query string: {}", err);
    bad_request(format!("Invalid query string: {}", err))
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    debug!("Bad JSON body: {}", err);
    bad_request(format!("Invalid JSON body: {}", err))
}

/// Register the intake routes and their extractor settings
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::JsonConfig::default().error_handler(json_error))
        .service(send_text)
        .service(send_json)
        .service(status);
}
