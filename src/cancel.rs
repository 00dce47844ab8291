//! Cancellation of suspending steps.
//!
//! Every step of a dispatch that can suspend (body creation, the transport
//! round trip, body reads, stream copies) runs through [`with_cancellation`],
//! so one `CancellationToken` aborts the whole operation.

use crate::error::{RestError, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Run `fut` unless `cancel` fires first.
///
/// An already cancelled token fails immediately without polling `fut`. When
/// the token fires mid-flight the future is dropped, aborting the step.
///
/// # Examples
///
/// ```
/// use typed_rest_http::client::with_cancellation;
/// use tokio_util::sync::CancellationToken;
///
/// # tokio_test::block_on(async {
/// let cancel = CancellationToken::new();
/// let value = with_cancellation(&cancel, async { Ok(7) }).await.unwrap();
/// assert_eq!(value, 7);
///
/// cancel.cancel();
/// let err = with_cancellation(&cancel, async { Ok(7) }).await.unwrap_err();
/// assert!(err.is_cancelled());
/// # });
/// ```
pub async fn with_cancellation<F, T>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if cancel.is_cancelled() {
        return Err(RestError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RestError::Cancelled),
        result = fut => result,
    }
}
