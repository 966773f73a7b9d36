use crate::{Notification, Request};
use tokio_util::sync::CancellationToken;

/// A mediator is a central hub for communication between components.
#[async_trait::async_trait]
pub trait Mediator: Send + Sync {
    /// Sends a request to its handler and returns the response.
    async fn send<Req, Res>(&self, req: Req) -> crate::Result<Res>
    where
        Res: Send + 'static,
        Req: Request<Res> + Send + 'static,
    {
        self.send_with_cancel(req, CancellationToken::new()).await
    }

    /// Sends a request, passing `cancel` to the handler.
    async fn send_with_cancel<Req, Res>(
        &self,
        req: Req,
        cancel: CancellationToken,
    ) -> crate::Result<Res>
    where
        Res: Send + 'static,
        Req: Request<Res> + Send + 'static;

    /// Publish a notification to every handler subscribed to it.
    async fn publish<N>(&self, notification: N) -> crate::Result<()>
    where
        N: Notification + Send + 'static,
    {
        self.publish_with_cancel(notification, CancellationToken::new())
            .await
    }

    /// Publish a notification, passing `cancel` to every handler.
    async fn publish_with_cancel<N>(
        &self,
        notification: N,
        cancel: CancellationToken,
    ) -> crate::Result<()>
    where
        N: Notification + Send + 'static;
}
