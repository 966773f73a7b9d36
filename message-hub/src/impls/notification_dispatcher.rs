use crate::error::{AggregateError, Error};
use crate::{
    FailurePolicy, HandlerRegistry, Notification, NotificationHandler, PublishStrategy,
    ResolvedHandler,
};
use futures::future::{join_all, try_join_all};
use std::any::type_name;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Routes each notification to every handler registered for it.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    registry: Arc<HandlerRegistry>,
    strategy: PublishStrategy,
    policy: FailurePolicy,
}

impl NotificationDispatcher {
    /// Constructs a dispatcher reading from `registry`.
    pub fn new(
        registry: Arc<HandlerRegistry>,
        strategy: PublishStrategy,
        policy: FailurePolicy,
    ) -> Self {
        NotificationDispatcher {
            registry,
            strategy,
            policy,
        }
    }

    /// The strategy used to invoke handlers.
    pub fn strategy(&self) -> PublishStrategy {
        self.strategy
    }

    /// The policy applied when a handler fails.
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Invokes every handler of the notification exactly once.
    ///
    /// Publishing a notification nobody subscribed to is not an error.
    pub async fn publish<N>(&self, notification: N, cancel: CancellationToken) -> crate::Result<()>
    where
        N: Notification + Send + 'static,
    {
        let handlers = self.registry.resolve_all::<N>();
        let name = type_name::<N>();

        if handlers.is_empty() {
            log::trace!("no handlers for `{}`", name);
            return Ok(());
        }

        log::debug!(
            "publishing `{}` to {} handler(s), {:?}, {:?}",
            name,
            handlers.len(),
            self.strategy,
            self.policy
        );

        let failures = match self.strategy {
            PublishStrategy::Sequential => {
                let mut failures = Vec::new();
                for handler in &handlers {
                    let call = invoke(handler, notification.clone(), cancel.clone());
                    if let Err(err) = call.await {
                        match self.policy {
                            FailurePolicy::FailFast => return Err(err),
                            FailurePolicy::FailSoft => {
                                log::warn!("{}", err);
                                failures.push(err);
                            }
                        }
                    }
                }
                failures
            }
            PublishStrategy::Concurrent => {
                let mut calls = Vec::with_capacity(handlers.len());
                for handler in &handlers {
                    calls.push(invoke(handler, notification.clone(), cancel.clone()));
                }

                match self.policy {
                    FailurePolicy::FailFast => {
                        try_join_all(calls).await?;
                        Vec::new()
                    }
                    FailurePolicy::FailSoft => join_all(calls)
                        .await
                        .into_iter()
                        .filter_map(Result::err)
                        .inspect(|err| log::warn!("{}", err))
                        .collect(),
                }
            }
        };

        if failures.is_empty() {
            Ok(())
        } else {
            Err(AggregateError::new(name, failures).into())
        }
    }
}

async fn invoke<N>(
    handler: &ResolvedHandler<dyn NotificationHandler<N>>,
    notification: N,
    cancel: CancellationToken,
) -> crate::Result<()>
where
    N: Notification + Send + 'static,
{
    log::trace!("invoking `{}` for `{}`", handler.name(), type_name::<N>());
    handler
        .handle(notification, cancel)
        .await
        .map_err(|source| Error::execution(handler.name(), source))
}
