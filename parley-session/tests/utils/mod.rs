
use std::time::Duration;
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub async fn wait_until(what: &str, timeout_ms: u64, cond: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    while !cond() {
        if tokio::time::Instant::now() > deadline {
            panic!("Timed out waiting until {}", what);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
