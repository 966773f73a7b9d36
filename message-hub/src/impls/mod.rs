/// Provides a default implementation of the `Mediator` trait.
mod mediator_impl;
pub use mediator_impl::*;

/// Provides the request dispatcher.
mod request_dispatcher;
pub use request_dispatcher::*;

/// Provides the notification dispatcher.
mod notification_dispatcher;
pub use notification_dispatcher::*;
