use crate::{HandlerRegistry, Request};
use std::any::type_name;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Routes each request to the single handler registered for it.
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    registry: Arc<HandlerRegistry>,
}

impl RequestDispatcher {
    /// Constructs a dispatcher reading from `registry`.
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        RequestDispatcher { registry }
    }

    /// Sends `req` to its handler and returns whatever the handler produces.
    pub async fn send<Req, Res>(&self, req: Req, cancel: CancellationToken) -> crate::Result<Res>
    where
        Res: Send + 'static,
        Req: Request<Res> + Send + 'static,
    {
        let handler = self.registry.resolve_one::<Req, Res>().map_err(|err| {
            log::debug!("cannot send `{}`: {}", type_name::<Req>(), err);
            err
        })?;

        log::trace!("sending `{}` to `{}`", type_name::<Req>(), handler.name());
        Ok(handler.handle(req, cancel).await)
    }
}
