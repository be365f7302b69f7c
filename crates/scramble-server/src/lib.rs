//! HTTP adapter for the memory-scramble board.
//!
//! Exposes the flip protocol as a small family of long-poll `GET` routes —
//! `look`, `flip`, `watch`, `replace`, `reset` — plus a liveness `health`
//! route, all backed by a single shared [`scramble_board::Board`].
//!
//! ## Routes
//!
//! - [`handlers`] — the route handlers themselves

pub mod handlers;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use scramble_board::Board;
use scramble_core::GameError;
use std::sync::Arc;

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Shared server state: the live board plus the labels it was first loaded
/// with, so `/reset` can restore the original deal without needing the
/// caller to resend it.
pub struct GameServer {
    pub board: Arc<Board>,
    pub initial_labels: Vec<String>,
}

impl GameServer {
    pub fn new(board: Arc<Board>, initial_labels: Vec<String>) -> Self {
        Self { board, initial_labels }
    }
}

/// Maps the board's error taxonomy onto HTTP status codes: malformed
/// requests are `400`, turn-protocol conflicts (a blocked flip failing fast
/// on a removed card, calling `flipSecond` out of turn) are `409`, and a
/// corrupt board file is a `500` since it reflects a server misconfiguration
/// rather than anything the caller did.
pub fn error_response(err: &GameError) -> HttpResponse {
    match err {
        GameError::InvalidInput(msg) => HttpResponse::BadRequest().body(msg.clone()),
        GameError::FlipError(reason) => HttpResponse::Conflict().body(reason.to_string()),
        GameError::InvalidState(msg) => HttpResponse::Conflict().body(msg.clone()),
        GameError::ParseError(msg) => HttpResponse::InternalServerError().body(msg.clone()),
    }
}

#[rustfmt::skip]
pub async fn run(state: GameServer, bind_addr: String) -> Result<(), std::io::Error> {
    let state = web::Data::new(state);
    log::info!("starting memory-scramble server on {bind_addr}");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(state.clone())
            .route("/health", web::get().to(health))
            .route("/look/{player_id}", web::get().to(handlers::look))
            .route("/flip/{player_id}/{position}", web::get().to(handlers::flip))
            .route("/watch/{player_id}", web::get().to(handlers::watch))
            .route("/replace/{player_id}/{from}/{to}", web::get().to(handlers::replace))
            .route("/reset/{player_id}", web::get().to(handlers::reset))
    })
    .bind(bind_addr)?
    .run()
    .await
}
