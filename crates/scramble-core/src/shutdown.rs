//! Ctrl+C handling. The board has no on-disk state to flush (persistence
//! is an explicit non-goal), so shutdown is immediate rather than graceful.

/// Register a Ctrl+C handler that exits the process immediately.
pub fn on_interrupt() {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.expect("listen for ctrl-c");
        log::warn!("interrupt received, exiting");
        std::process::exit(0);
    });
}
