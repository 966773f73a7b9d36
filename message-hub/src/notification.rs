use crate::BoxError;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Result returned by a [NotificationHandler].
pub type HandlerResult = std::result::Result<(), BoxError>;

/// Represents an application notification.
///
/// Every handler receives its own clone of the published value.
pub trait Notification: Clone {}

/// A handler for application notifications.
#[async_trait::async_trait]
pub trait NotificationHandler<N>: Send + Sync
where
    N: Notification,
{
    /// Handles a notification.
    async fn handle(&self, notification: N, cancel: CancellationToken) -> HandlerResult;
}

// Adapts a closure into a `NotificationHandler`.
pub(crate) struct NotificationHandlerFn<F>(pub(crate) F);

#[async_trait::async_trait]
impl<N, F, Fut> NotificationHandler<N> for NotificationHandlerFn<F>
where
    N: Notification + Send + 'static,
    F: Fn(N, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn handle(&self, notification: N, cancel: CancellationToken) -> HandlerResult {
        (self.0)(notification, cancel).await
    }
}
