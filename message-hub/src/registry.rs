use crate::error::Error;
use crate::{Notification, NotificationHandler, Request, RequestHandler};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

/// How long a registered handler lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifetime {
    /// A new handler is constructed each time it is resolved.
    Transient,
    /// The handler is constructed on first resolution and shared afterwards.
    #[default]
    Singleton,
}

type Factory<H> = Box<dyn Fn() -> Arc<H> + Send + Sync>;

// Requests are keyed by request and response type, a type may be a request for several responses.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
struct MessageKey {
    req_ty: TypeId,
    res_ty: TypeId,
}

impl MessageKey {
    fn of<Req: 'static, Res: 'static>() -> Self {
        MessageKey {
            req_ty: TypeId::of::<Req>(),
            res_ty: TypeId::of::<Res>(),
        }
    }
}

// A registered handler. `H` is always a `dyn RequestHandler<..>` or `dyn NotificationHandler<..>`.
struct Descriptor<H: ?Sized> {
    name: &'static str,
    lifetime: Lifetime,
    factory: Factory<H>,
    instance: OnceLock<Arc<H>>,
}

impl<H: ?Sized> Descriptor<H> {
    fn new(name: &'static str, lifetime: Lifetime, factory: Factory<H>) -> Self {
        Descriptor {
            name,
            lifetime,
            factory,
            instance: OnceLock::new(),
        }
    }

    fn resolve(&self) -> ResolvedHandler<H> {
        let handler = match self.lifetime {
            Lifetime::Transient => (self.factory)(),
            Lifetime::Singleton => self.instance.get_or_init(|| (self.factory)()).clone(),
        };

        ResolvedHandler {
            name: self.name,
            handler,
        }
    }
}

// The descriptor is type erased so handlers for every message type share one map.
struct Entry {
    name: &'static str,
    descriptor: Box<dyn Any + Send + Sync>,
}

struct Slot {
    message: &'static str,
    entries: Vec<Entry>,
}

impl Slot {
    fn new(message: &'static str) -> Self {
        Slot {
            message,
            entries: Vec::new(),
        }
    }

    fn handler_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.name).collect()
    }
}

/// A handler obtained from the [HandlerRegistry].
///
/// Dereferences to the handler itself.
pub struct ResolvedHandler<H: ?Sized> {
    name: &'static str,
    handler: Arc<H>,
}

impl<H: ?Sized> ResolvedHandler<H> {
    /// Type name of the concrete handler.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the shared handler.
    pub fn into_inner(self) -> Arc<H> {
        self.handler
    }
}

impl<H: ?Sized> Deref for ResolvedHandler<H> {
    type Target = H;

    fn deref(&self) -> &H {
        &self.handler
    }
}

impl<H: ?Sized> Clone for ResolvedHandler<H> {
    fn clone(&self) -> Self {
        ResolvedHandler {
            name: self.name,
            handler: self.handler.clone(),
        }
    }
}

impl<H: ?Sized> fmt::Debug for ResolvedHandler<H> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ResolvedHandler").field(&self.name).finish()
    }
}

/// Maps message types to the handlers able to process them.
///
/// The registry is populated once, usually through the mediator `Builder`,
/// and only read afterwards.
#[derive(Default)]
pub struct HandlerRegistry {
    requests: HashMap<MessageKey, Slot>,
    notifications: HashMap<TypeId, Slot>,
}

impl HandlerRegistry {
    /// Constructs an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a request handler built by `factory` according to `lifetime`.
    pub fn register_request<Req, Res, H, F>(&mut self, lifetime: Lifetime, factory: F)
    where
        Req: Request<Res> + 'static,
        Res: 'static,
        H: RequestHandler<Req, Res> + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        let factory: Factory<dyn RequestHandler<Req, Res>> =
            Box::new(move || -> Arc<dyn RequestHandler<Req, Res>> { Arc::new(factory()) });

        self.insert_request(Descriptor::new(type_name::<H>(), lifetime, factory));
    }

    /// Registers an already constructed request handler as a singleton.
    pub fn register_request_instance<Req, Res, H>(&mut self, handler: H)
    where
        Req: Request<Res> + 'static,
        Res: 'static,
        H: RequestHandler<Req, Res> + 'static,
    {
        let handler: Arc<dyn RequestHandler<Req, Res>> = Arc::new(handler);
        let factory: Factory<dyn RequestHandler<Req, Res>> = Box::new(move || handler.clone());

        self.insert_request(Descriptor::new(
            type_name::<H>(),
            Lifetime::Singleton,
            factory,
        ));
    }

    /// Registers a notification handler built by `factory` according to `lifetime`.
    pub fn register_notification<N, H, F>(&mut self, lifetime: Lifetime, factory: F)
    where
        N: Notification + 'static,
        H: NotificationHandler<N> + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        let factory: Factory<dyn NotificationHandler<N>> =
            Box::new(move || -> Arc<dyn NotificationHandler<N>> { Arc::new(factory()) });

        self.insert_notification(Descriptor::new(type_name::<H>(), lifetime, factory));
    }

    /// Registers an already constructed notification handler as a singleton.
    pub fn register_notification_instance<N, H>(&mut self, handler: H)
    where
        N: Notification + 'static,
        H: NotificationHandler<N> + 'static,
    {
        let handler: Arc<dyn NotificationHandler<N>> = Arc::new(handler);
        let factory: Factory<dyn NotificationHandler<N>> = Box::new(move || handler.clone());

        self.insert_notification(Descriptor::new(
            type_name::<H>(),
            Lifetime::Singleton,
            factory,
        ));
    }

    fn insert_request<Req, Res>(&mut self, descriptor: Descriptor<dyn RequestHandler<Req, Res>>)
    where
        Req: Request<Res> + 'static,
        Res: 'static,
    {
        log::trace!(
            "registering request handler `{}` for `{}`",
            descriptor.name,
            type_name::<Req>()
        );

        self.requests
            .entry(MessageKey::of::<Req, Res>())
            .or_insert_with(|| Slot::new(type_name::<Req>()))
            .entries
            .push(Entry {
                name: descriptor.name,
                descriptor: Box::new(descriptor),
            });
    }

    fn insert_notification<N>(&mut self, descriptor: Descriptor<dyn NotificationHandler<N>>)
    where
        N: Notification + 'static,
    {
        log::trace!(
            "registering notification handler `{}` for `{}`",
            descriptor.name,
            type_name::<N>()
        );

        self.notifications
            .entry(TypeId::of::<N>())
            .or_insert_with(|| Slot::new(type_name::<N>()))
            .entries
            .push(Entry {
                name: descriptor.name,
                descriptor: Box::new(descriptor),
            });
    }

    /// Returns the single handler for the request type.
    ///
    /// Fails with [Error::NotFound] if no handler is registered and with
    /// [Error::Ambiguous] if there is more than one.
    pub fn resolve_one<Req, Res>(
        &self,
    ) -> crate::Result<ResolvedHandler<dyn RequestHandler<Req, Res>>>
    where
        Req: Request<Res> + 'static,
        Res: 'static,
    {
        let message = type_name::<Req>();
        let slot = self
            .requests
            .get(&MessageKey::of::<Req, Res>())
            .ok_or(Error::NotFound(message))?;

        match slot.entries.as_slice() {
            [entry] => entry
                .descriptor
                .downcast_ref::<Descriptor<dyn RequestHandler<Req, Res>>>()
                .map(|descriptor| descriptor.resolve())
                .ok_or(Error::NotFound(message)),
            [] => Err(Error::NotFound(message)),
            entries => Err(Error::Ambiguous {
                message,
                count: entries.len(),
            }),
        }
    }

    /// Returns every handler for the notification type in registration order.
    ///
    /// An unknown notification type yields no handlers.
    pub fn resolve_all<N>(&self) -> Vec<ResolvedHandler<dyn NotificationHandler<N>>>
    where
        N: Notification + 'static,
    {
        match self.notifications.get(&TypeId::of::<N>()) {
            Some(slot) => slot
                .entries
                .iter()
                .filter_map(|entry| {
                    entry
                        .descriptor
                        .downcast_ref::<Descriptor<dyn NotificationHandler<N>>>()
                })
                .map(|descriptor| descriptor.resolve())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Checks that no request type has more than one handler.
    pub fn validate(&self) -> crate::Result<()> {
        match self.requests.values().find(|slot| slot.entries.len() > 1) {
            Some(slot) => Err(Error::Ambiguous {
                message: slot.message,
                count: slot.entries.len(),
            }),
            None => Ok(()),
        }
    }

    /// Number of handlers registered for the request type.
    pub fn request_handler_count<Req, Res>(&self) -> usize
    where
        Req: Request<Res> + 'static,
        Res: 'static,
    {
        self.requests
            .get(&MessageKey::of::<Req, Res>())
            .map_or(0, |slot| slot.entries.len())
    }

    /// Number of handlers registered for the notification type.
    pub fn notification_handler_count<N>(&self) -> usize
    where
        N: Notification + 'static,
    {
        self.notifications
            .get(&TypeId::of::<N>())
            .map_or(0, |slot| slot.entries.len())
    }

    /// Names of the registered request types.
    pub fn request_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.requests.values().map(|slot| slot.message)
    }

    /// Names of the registered notification types.
    pub fn notification_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.notifications.values().map(|slot| slot.message)
    }

    /// Returns `true` if no handler has been registered.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty() && self.notifications.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        struct Slots<'a, K>(&'a HashMap<K, Slot>);

        impl<K> fmt::Debug for Slots<'_, K> {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.debug_map()
                    .entries(
                        self.0
                            .values()
                            .map(|slot| (slot.message, slot.handler_names())),
                    )
                    .finish()
            }
        }

        f.debug_struct("HandlerRegistry")
            .field("requests", &Slots(&self.requests))
            .field("notifications", &Slots(&self.notifications))
            .finish()
    }
}
