use crate::GameServer;
use crate::error_response;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use scramble_board::is_valid_player_id;
use scramble_core::Position;

fn validated_player(player_id: &str) -> Result<&str, HttpResponse> {
    if is_valid_player_id(player_id) {
        Ok(player_id)
    } else {
        Err(HttpResponse::BadRequest().body(format!("invalid player id {:?}", player_id)))
    }
}

/// Path segments look like `row,col` (e.g. `/flip/p1/2,3`).
fn parse_position(segment: &str) -> Result<Position, HttpResponse> {
    let (row, col) = segment
        .split_once(',')
        .ok_or_else(|| HttpResponse::BadRequest().body(format!("expected ROW,COL, got {:?}", segment)))?;
    let row: usize = row
        .parse()
        .map_err(|_| HttpResponse::BadRequest().body(format!("invalid row {:?}", row)))?;
    let col: usize = col
        .parse()
        .map_err(|_| HttpResponse::BadRequest().body(format!("invalid col {:?}", col)))?;
    Ok((row, col))
}

pub async fn look(state: web::Data<GameServer>, path: web::Path<String>) -> impl Responder {
    let player_id = path.into_inner();
    let player_id = match validated_player(&player_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().body(state.board.look(player_id).await)
}

pub async fn watch(state: web::Data<GameServer>, path: web::Path<String>) -> impl Responder {
    let player_id = path.into_inner();
    let player_id = match validated_player(&player_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().body(state.board.watch(player_id).await)
}

pub async fn flip(state: web::Data<GameServer>, path: web::Path<(String, String)>) -> impl Responder {
    let (player_id, position) = path.into_inner();
    let player_id = match validated_player(&player_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let pos = match parse_position(&position) {
        Ok(pos) => pos,
        Err(resp) => return resp,
    };
    match state.board.flip(player_id, pos).await {
        Ok(text) => HttpResponse::Ok().body(text),
        Err(err) => error_response(&err),
    }
}

pub async fn replace(state: web::Data<GameServer>, path: web::Path<(String, String, String)>) -> impl Responder {
    let (player_id, from, to) = path.into_inner();
    if validated_player(&player_id).is_err() {
        return HttpResponse::BadRequest().body(format!("invalid player id {:?}", player_id));
    }
    if !scramble_board::is_valid_label(&to) {
        return HttpResponse::BadRequest().body(format!("invalid replacement label {:?}", to));
    }
    let result = state
        .board
        .map(|label| {
            let from = from.clone();
            let to = to.clone();
            async move { if label == from { to } else { label } }
        })
        .await;
    match result {
        Ok(()) => HttpResponse::Ok().body(state.board.look(&player_id).await),
        Err(err) => error_response(&err),
    }
}

pub async fn reset(state: web::Data<GameServer>, path: web::Path<String>) -> impl Responder {
    let player_id = path.into_inner();
    if validated_player(&player_id).is_err() {
        return HttpResponse::BadRequest().body(format!("invalid player id {:?}", player_id));
    }
    match state.board.reset(state.initial_labels.clone()).await {
        Ok(()) => HttpResponse::Ok().body(state.board.look(&player_id).await),
        Err(err) => error_response(&err),
    }
}
