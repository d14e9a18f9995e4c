// Graceful shutdown module
// Waits for in-flight connections after the accept loop has stopped

use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::config::AppState;
use crate::logger;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Wait until every open connection has finished or `grace` elapses.
///
/// Returns the number of connections still open when it gave up.
pub async fn drain_connections(state: &AppState, grace: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + grace;

    loop {
        let remaining = state.active_connections.load(Ordering::SeqCst);
        if remaining == 0 {
            return 0;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown grace period elapsed with {remaining} connections open"
            ));
            return remaining;
        }
        logger::log_debug(&format!("Draining {remaining} connections..."));
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_returns_immediately_when_idle() {
        let state = AppState::new(Config::default());
        assert_eq!(drain_connections(&state, Duration::from_secs(5)).await, 0);
    }

    #[tokio::test]
    async fn test_waits_for_connection_to_finish() {
        let state = Arc::new(AppState::new(Config::default()));
        state.active_connections.store(1, Ordering::SeqCst);

        let closer = Arc::clone(&state);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(120)).await;
            closer.active_connections.fetch_sub(1, Ordering::SeqCst);
        });

        assert_eq!(drain_connections(&state, Duration::from_secs(5)).await, 0);
    }

    #[tokio::test]
    async fn test_gives_up_after_grace() {
        let state = AppState::new(Config::default());
        state.active_connections.store(2, Ordering::SeqCst);
        assert_eq!(drain_connections(&state, Duration::from_millis(100)).await, 2);
    }
}
