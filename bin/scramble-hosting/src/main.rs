//! Memory Scramble Game Server
//!
//! Loads a board file and serves the flip protocol over HTTP.
//! Board file path and bind address can come from flags or env vars
//! (`BOARD_FILE`, `BIND_ADDR`).

use clap::Parser;
use scramble_server::GameServer;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "scramble-hosting", about = "Memory Scramble game server")]
struct Args {
    /// Path to a board file in ROWSxCOLS grammar.
    #[arg(long, env = "BOARD_FILE")]
    board: String,

    /// Address to bind the HTTP server to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind: String,
}

#[tokio::main]
async fn main() {
    scramble_core::init_logging();
    scramble_core::on_interrupt();

    let args = Args::parse();
    let (rows, cols, labels) = scramble_board::parse_path(&args.board)
        .unwrap_or_else(|e| panic!("failed to load board file {}: {e}", args.board));
    log::info!("loaded {rows}x{cols} board from {}", args.board);

    let board = Arc::new(
        scramble_board::Board::new(rows, cols, labels.clone())
            .expect("board file passed parsing but failed construction"),
    );
    let state = GameServer::new(board, labels);

    scramble_server::run(state, args.bind).await.unwrap();
}
