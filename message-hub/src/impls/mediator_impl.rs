use crate::notification::NotificationHandlerFn;
use crate::request::RequestHandlerFn;
use crate::{
    FailurePolicy, HandlerRegistry, HandlerResult, Lifetime, Mediator, MediatorConfig,
    Notification, NotificationDispatcher, NotificationHandler, PublishStrategy, Request,
    RequestDispatcher, RequestHandler,
};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A default implementation for the [Mediator] trait.
///
/// Clones share the same handlers.
///
/// # Examples
///
/// ## Request handler
/// ```
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use message_hub::{CancellationToken, DefaultMediator, Mediator, Request, RequestHandler};
///
/// struct GetNextId;
/// impl Request<u64> for GetNextId {}
///
/// struct GetNextIdHandler(AtomicU64);
///
/// #[message_hub::async_trait]
/// impl RequestHandler<GetNextId, u64> for GetNextIdHandler {
///     async fn handle(&self, _: GetNextId, _: CancellationToken) -> u64 {
///         self.0.fetch_add(1, Ordering::SeqCst)
///     }
/// }
///
/// # futures::executor::block_on(async {
/// let mediator = DefaultMediator::builder()
///     .add_handler(GetNextIdHandler(AtomicU64::new(1)))
///     .build();
///
/// assert_eq!(mediator.send(GetNextId).await.unwrap(), 1);
/// assert_eq!(mediator.send(GetNextId).await.unwrap(), 2);
/// # });
/// ```
///
/// ## Notification handler
/// ```
/// use std::sync::{Arc, Mutex};
/// use message_hub::{DefaultMediator, Mediator, Notification};
///
/// #[derive(Clone)]
/// struct ProductAdded(String);
/// impl Notification for ProductAdded {}
///
/// let added = Arc::new(Mutex::new(Vec::new()));
/// let log = added.clone();
///
/// let mediator = DefaultMediator::builder()
///     .subscribe_fn(move |event: ProductAdded, _| {
///         let log = log.clone();
///         async move {
///             log.lock().unwrap().push(event.0);
///             Ok(())
///         }
///     })
///     .build();
///
/// # futures::executor::block_on(async {
/// mediator.publish(ProductAdded("Microwave".to_owned())).await.unwrap();
/// mediator.publish(ProductAdded("Toaster".to_owned())).await.unwrap();
/// # });
/// assert_eq!(*added.lock().unwrap(), vec!["Microwave", "Toaster"]);
/// ```
#[derive(Debug, Clone)]
pub struct DefaultMediator {
    registry: Arc<HandlerRegistry>,
    config: MediatorConfig,
    requests: RequestDispatcher,
    notifications: NotificationDispatcher,
}

impl DefaultMediator {
    /// Gets a [DefaultMediator] builder.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// The handlers known to this mediator.
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// The configuration this mediator was built with.
    pub fn config(&self) -> &MediatorConfig {
        &self.config
    }

    fn from_parts(registry: HandlerRegistry, config: MediatorConfig) -> Self {
        let registry = Arc::new(registry);

        DefaultMediator {
            requests: RequestDispatcher::new(registry.clone()),
            notifications: NotificationDispatcher::new(
                registry.clone(),
                config.publish_strategy,
                config.failure_policy,
            ),
            registry,
            config,
        }
    }
}

#[async_trait::async_trait]
impl Mediator for DefaultMediator {
    async fn send_with_cancel<Req, Res>(
        &self,
        req: Req,
        cancel: CancellationToken,
    ) -> crate::Result<Res>
    where
        Res: Send + 'static,
        Req: Request<Res> + Send + 'static,
    {
        self.requests.send(req, cancel).await
    }

    async fn publish_with_cancel<N>(
        &self,
        notification: N,
        cancel: CancellationToken,
    ) -> crate::Result<()>
    where
        N: Notification + Send + 'static,
    {
        self.notifications.publish(notification, cancel).await
    }
}

/// A builder for the [DefaultMediator].
///
/// Handlers can only be registered here, a built mediator never changes.
#[derive(Debug, Default)]
pub struct Builder {
    registry: HandlerRegistry,
    config: MediatorConfig,
}

impl Builder {
    /// Constructs a new `Builder`.
    pub fn new() -> Self {
        Builder::default()
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: MediatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets how notification handlers are invoked.
    pub fn publish_strategy(mut self, strategy: PublishStrategy) -> Self {
        self.config.publish_strategy = strategy;
        self
    }

    /// Sets what happens when a notification handler fails.
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    /// Registers a request handler, shared by every send.
    pub fn add_handler<Req, Res, H>(mut self, handler: H) -> Self
    where
        Req: Request<Res> + 'static,
        Res: 'static,
        H: RequestHandler<Req, Res> + 'static,
    {
        self.registry
            .register_request_instance::<Req, Res, H>(handler);
        self
    }

    /// Registers a request handler from a function.
    pub fn add_handler_fn<Req, Res, F, Fut>(mut self, handler: F) -> Self
    where
        Req: Request<Res> + Send + 'static,
        Res: Send + 'static,
        F: Fn(Req, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Res> + Send + 'static,
    {
        self.registry
            .register_request_instance::<Req, Res, _>(RequestHandlerFn(handler));
        self
    }

    /// Registers a request handler constructed by `factory` each time a request is sent.
    pub fn add_transient_handler<Req, Res, H, F>(self, factory: F) -> Self
    where
        Req: Request<Res> + 'static,
        Res: 'static,
        H: RequestHandler<Req, Res> + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.add_handler_with::<Req, Res, H, F>(Lifetime::Transient, factory)
    }

    /// Registers a request handler constructed by `factory` according to `lifetime`.
    ///
    /// A [Lifetime::Singleton] factory runs once, on the first send.
    pub fn add_handler_with<Req, Res, H, F>(mut self, lifetime: Lifetime, factory: F) -> Self
    where
        Req: Request<Res> + 'static,
        Res: 'static,
        H: RequestHandler<Req, Res> + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.registry
            .register_request::<Req, Res, H, F>(lifetime, factory);
        self
    }

    /// Registers a notification handler, shared by every publish.
    ///
    /// Subscribing the same handler twice makes it run twice per publish.
    pub fn subscribe<N, H>(mut self, handler: H) -> Self
    where
        N: Notification + 'static,
        H: NotificationHandler<N> + 'static,
    {
        self.registry
            .register_notification_instance::<N, H>(handler);
        self
    }

    /// Registers a notification handler from a function.
    pub fn subscribe_fn<N, F, Fut>(mut self, handler: F) -> Self
    where
        N: Notification + Send + 'static,
        F: Fn(N, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.registry
            .register_notification_instance::<N, _>(NotificationHandlerFn(handler));
        self
    }

    /// Registers a notification handler constructed by `factory` on each publish.
    pub fn subscribe_transient<N, H, F>(self, factory: F) -> Self
    where
        N: Notification + 'static,
        H: NotificationHandler<N> + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.subscribe_with::<N, H, F>(Lifetime::Transient, factory)
    }

    /// Registers a notification handler constructed by `factory` according to `lifetime`.
    pub fn subscribe_with<N, H, F>(mut self, lifetime: Lifetime, factory: F) -> Self
    where
        N: Notification + 'static,
        H: NotificationHandler<N> + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.registry
            .register_notification::<N, H, F>(lifetime, factory);
        self
    }

    /// Builds a `DefaultMediator`.
    ///
    /// Ambiguous request registrations are kept and reported by `send`,
    /// use [Builder::try_build] to reject them here.
    pub fn build(self) -> DefaultMediator {
        log::debug!(
            "mediator built with {} request type(s) and {} notification type(s), {:?}",
            self.registry.request_types().count(),
            self.registry.notification_types().count(),
            self.config
        );

        DefaultMediator::from_parts(self.registry, self.config)
    }

    /// Builds a `DefaultMediator`, failing if a request type has more than one handler.
    pub fn try_build(self) -> crate::Result<DefaultMediator> {
        self.registry.validate()?;
        Ok(self.build())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        CancellationToken, DefaultMediator, Error, ErrorKind, FailurePolicy, HandlerResult,
        Lifetime, Mediator, MediatorConfig, Notification, NotificationHandler, PublishStrategy,
        Request, RequestHandler,
    };
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Drink {
        name: String,
    }

    struct AskFavorite;
    impl Request<Drink> for AskFavorite {}

    struct FavoriteHandler;
    #[async_trait::async_trait]
    impl RequestHandler<AskFavorite, Drink> for FavoriteHandler {
        async fn handle(&self, _: AskFavorite, _: CancellationToken) -> Drink {
            Drink {
                name: "Macchiato".to_owned(),
            }
        }
    }

    struct OtherFavoriteHandler;
    #[async_trait::async_trait]
    impl RequestHandler<AskFavorite, Drink> for OtherFavoriteHandler {
        async fn handle(&self, _: AskFavorite, _: CancellationToken) -> Drink {
            Drink {
                name: "Flat white".to_owned(),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct BreakStarted {
        time: (u8, u8),
        drink_name: String,
    }
    impl Notification for BreakStarted {}

    // Keeps every notification it receives.
    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<BreakStarted>>>);

    impl Recorder {
        fn calls(&self) -> Vec<BreakStarted> {
            self.0.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl NotificationHandler<BreakStarted> for Recorder {
        async fn handle(&self, event: BreakStarted, _: CancellationToken) -> HandlerResult {
            self.0.lock().unwrap().push(event);
            Ok(())
        }
    }

    fn break_at_half_past_nine() -> BreakStarted {
        BreakStarted {
            time: (9, 30),
            drink_name: "Macchiato".to_owned(),
        }
    }

    #[tokio::test]
    async fn send_returns_the_handler_value() {
        let mediator = DefaultMediator::builder()
            .add_handler(FavoriteHandler)
            .build();

        let drink = mediator.send(AskFavorite).await.unwrap();
        assert_eq!(
            drink,
            Drink {
                name: "Macchiato".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn publish_reaches_both_handlers_once() {
        let a = Recorder::default();
        let b = Recorder::default();

        let mediator = DefaultMediator::builder()
            .subscribe(a.clone())
            .subscribe(b.clone())
            .build();

        mediator.publish(break_at_half_past_nine()).await.unwrap();

        assert_eq!(a.calls(), vec![break_at_half_past_nine()]);
        assert_eq!(b.calls(), vec![break_at_half_past_nine()]);
    }

    #[tokio::test]
    async fn send_unregistered_request_leaves_registry_untouched() {
        let mediator = DefaultMediator::builder()
            .subscribe(Recorder::default())
            .build();

        let err = mediator.send(AskFavorite).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        assert_eq!(mediator.registry().request_handler_count::<AskFavorite, Drink>(), 0);
        assert_eq!(mediator.registry().request_types().count(), 0);
        assert_eq!(mediator.registry().notification_handler_count::<BreakStarted>(), 1);
    }

    #[tokio::test]
    async fn second_request_handler_makes_send_ambiguous() {
        let mediator = DefaultMediator::builder()
            .add_handler(FavoriteHandler)
            .add_handler(OtherFavoriteHandler)
            .build();

        match mediator.send(AskFavorite).await {
            Err(Error::Ambiguous { count, message }) => {
                assert_eq!(count, 2);
                assert!(message.ends_with("AskFavorite"));
            }
            other => panic!("expected ambiguous handler, got {:?}", other),
        }
    }

    #[test]
    fn try_build_rejects_ambiguous_requests() {
        let err = DefaultMediator::builder()
            .add_handler(FavoriteHandler)
            .add_handler(OtherFavoriteHandler)
            .try_build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Ambiguous);

        assert!(DefaultMediator::builder()
            .add_handler(FavoriteHandler)
            .subscribe(Recorder::default())
            .subscribe(Recorder::default())
            .try_build()
            .is_ok());
    }

    #[tokio::test]
    async fn duplicate_subscription_runs_twice() {
        let recorder = Recorder::default();

        let mediator = DefaultMediator::builder()
            .subscribe(recorder.clone())
            .subscribe(recorder.clone())
            .build();

        mediator.publish(break_at_half_past_nine()).await.unwrap();
        assert_eq!(recorder.calls().len(), 2);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_ok() {
        let mediator = DefaultMediator::builder().build();
        mediator.publish(break_at_half_past_nine()).await.unwrap();
    }

    #[tokio::test]
    async fn handler_fns_receive_message_and_token() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();

        let mediator = DefaultMediator::builder()
            .add_handler_fn(|_: AskFavorite, cancel: CancellationToken| async move {
                Drink {
                    name: if cancel.is_cancelled() {
                        "Nothing".to_owned()
                    } else {
                        "Espresso".to_owned()
                    },
                }
            })
            .subscribe_fn(move |event: BreakStarted, _| {
                let log = log.clone();
                async move {
                    log.lock().unwrap().push(event.drink_name);
                    Ok(())
                }
            })
            .build();

        let token = CancellationToken::new();
        token.cancel();
        let drink = mediator.send_with_cancel(AskFavorite, token).await.unwrap();
        assert_eq!(drink.name, "Nothing");
        assert_eq!(mediator.send(AskFavorite).await.unwrap().name, "Espresso");

        mediator
            .publish_with_cancel(break_at_half_past_nine(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["Macchiato".to_owned()]);
    }

    #[tokio::test]
    async fn transient_handlers_are_built_per_dispatch() {
        let built = Arc::new(AtomicUsize::new(0));
        let requests = built.clone();
        let notifications = built.clone();

        let mediator = DefaultMediator::builder()
            .add_transient_handler(move || {
                requests.fetch_add(1, Ordering::SeqCst);
                FavoriteHandler
            })
            .subscribe_transient(move || {
                notifications.fetch_add(1, Ordering::SeqCst);
                Recorder::default()
            })
            .build();

        mediator.send(AskFavorite).await.unwrap();
        mediator.send(AskFavorite).await.unwrap();
        mediator.publish(break_at_half_past_nine()).await.unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn config_is_applied_to_publish() {
        #[derive(Debug, thiserror::Error)]
        #[error("machine is off")]
        struct MachineOff;

        struct Broken;
        #[async_trait::async_trait]
        impl NotificationHandler<BreakStarted> for Broken {
            async fn handle(&self, _: BreakStarted, _: CancellationToken) -> HandlerResult {
                Err(Box::new(MachineOff))
            }
        }

        let recorder = Recorder::default();
        let mediator = DefaultMediator::builder()
            .with_config(MediatorConfig {
                publish_strategy: PublishStrategy::Concurrent,
                failure_policy: FailurePolicy::FailFast,
            })
            .failure_policy(FailurePolicy::FailSoft)
            .subscribe(Broken)
            .subscribe(recorder.clone())
            .build();

        assert_eq!(
            mediator.config().publish_strategy,
            PublishStrategy::Concurrent
        );

        let err = mediator.publish(break_at_half_past_nine()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Aggregate);
        assert_eq!(recorder.calls().len(), 1);
    }

    #[tokio::test]
    async fn clones_share_handlers() {
        let recorder = Recorder::default();
        let mediator = DefaultMediator::builder()
            .subscribe(recorder.clone())
            .build();

        let other = mediator.clone();
        let task = tokio::spawn(async move { other.publish(break_at_half_past_nine()).await });

        task.await.unwrap().unwrap();
        mediator.publish(break_at_half_past_nine()).await.unwrap();
        assert_eq!(recorder.calls().len(), 2);
    }

    #[tokio::test]
    async fn singleton_factories_run_once_on_first_use() {
        let built = Arc::new(AtomicUsize::new(0));
        let requests = built.clone();
        let notifications = built.clone();

        let mediator = DefaultMediator::builder()
            .add_handler_with(Lifetime::Singleton, move || {
                requests.fetch_add(1, Ordering::SeqCst);
                FavoriteHandler
            })
            .subscribe_with(Lifetime::Singleton, move || {
                notifications.fetch_add(1, Ordering::SeqCst);
                Recorder::default()
            })
            .build();

        assert_eq!(built.load(Ordering::SeqCst), 0);

        mediator.send(AskFavorite).await.unwrap();
        mediator.send(AskFavorite).await.unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 1);

        mediator.publish(break_at_half_past_nine()).await.unwrap();
        mediator.publish(break_at_half_past_nine()).await.unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn notifications_need_not_be_sync() {
        #[derive(Clone)]
        struct CupsPoured(Cell<u32>);
        impl Notification for CupsPoured {}

        let total = Arc::new(AtomicUsize::new(0));
        let counter = total.clone();

        let mediator = DefaultMediator::builder()
            .publish_strategy(PublishStrategy::Concurrent)
            .subscribe_fn(move |event: CupsPoured, _| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(event.0.get() as usize, Ordering::SeqCst);
                    Ok(())
                }
            })
            .build();

        mediator.publish(CupsPoured(Cell::new(3))).await.unwrap();
        assert_eq!(total.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn mediator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>(_: T) {}
        assert_send_sync(DefaultMediator::builder().build());
    }
}
