use std::future::Future;

use tokio_util::sync::CancellationToken;

use pimg_core::{AppError, AppResult};

/// Runs `future` unless `cancel` fires first, in which case the future is
/// dropped and [`AppError::Cancelled`] is returned.
pub(crate) async fn run_cancellable<F, T>(cancel: &CancellationToken, future: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(AppError::Cancelled),
        result = future => result,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use pimg_core::AppError;

    use super::run_cancellable;

    #[tokio::test]
    async fn completes_when_not_cancelled() {
        let result = run_cancellable(&CancellationToken::new(), async { Ok(7) }).await;
        assert!(matches!(result, Ok(7)));
    }

    #[tokio::test]
    async fn cancellation_aborts_a_pending_future() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result: Result<(), AppError> = run_cancellable(&cancel, async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(AppError::Cancelled)));
    }
}
