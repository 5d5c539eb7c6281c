use tokio::select;
use tokio_util::sync::CancellationToken;

/// Detects Ctrl-C and cancels the token so the menu loop can persist and leave instead of dying
/// with unsaved changes. Also returns once the token is cancelled from the menu side, so a normal
/// exit unwinds the join.
pub async fn detect_shutdown(cancellation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancellation.cancel();
        },
        _ = cancellation.cancelled() => {}
    };
}
