use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Represents a request to the mediator.
///
/// `Res` is the type produced by the single handler of the request. Fallible
/// requests use a `Result` as their response, the handler's error reaches the
/// caller as is.
pub trait Request<Res> {}

/// Handles a request to the mediator.
#[async_trait::async_trait]
pub trait RequestHandler<Req, Res>: Send + Sync
where
    Req: Request<Res>,
{
    /// Handle a request and returns the response.
    async fn handle(&self, req: Req, cancel: CancellationToken) -> Res;
}

// Adapts a closure into a `RequestHandler`.
pub(crate) struct RequestHandlerFn<F>(pub(crate) F);

#[async_trait::async_trait]
impl<Req, Res, F, Fut> RequestHandler<Req, Res> for RequestHandlerFn<F>
where
    Req: Request<Res> + Send + 'static,
    Res: Send + 'static,
    F: Fn(Req, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
{
    async fn handle(&self, req: Req, cancel: CancellationToken) -> Res {
        (self.0)(req, cancel).await
    }
}
