//! # message-hub
//! An in-process implementation of the Mediator pattern in Rust.
//!
//! Two kinds of messages go through the mediator:
//! - [Request]s are sent to exactly one [RequestHandler] and produce a typed response.
//! - [Notification]s are published to every [NotificationHandler] subscribed to them.
//!
//! Handlers are registered with a [Builder], the resulting [DefaultMediator] is immutable.
//!
//! ## Mediator Pattern
//! https://en.wikipedia.org/wiki/Mediator_pattern
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use message_hub::{
//!     CancellationToken, DefaultMediator, HandlerResult, Mediator, Notification,
//!     NotificationHandler, Request, RequestHandler,
//! };
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Drink(String);
//!
//! struct DrinkService {
//!     favorite: Drink,
//! }
//!
//! // Requests
//! struct AskFavorite;
//! impl Request<Drink> for AskFavorite {}
//!
//! struct AskFavoriteHandler(Arc<DrinkService>);
//!
//! #[message_hub::async_trait]
//! impl RequestHandler<AskFavorite, Drink> for AskFavoriteHandler {
//!     async fn handle(&self, _: AskFavorite, _: CancellationToken) -> Drink {
//!         self.0.favorite.clone()
//!     }
//! }
//!
//! // Notifications
//! #[derive(Clone)]
//! struct BreakStarted(Drink);
//! impl Notification for BreakStarted {}
//!
//! struct Barista(Arc<Mutex<Vec<Drink>>>);
//!
//! #[message_hub::async_trait]
//! impl NotificationHandler<BreakStarted> for Barista {
//!     async fn handle(&self, event: BreakStarted, _: CancellationToken) -> HandlerResult {
//!         self.0.lock().unwrap().push(event.0);
//!         Ok(())
//!     }
//! }
//!
//! let service = Arc::new(DrinkService { favorite: Drink("Macchiato".to_owned()) });
//! let orders = Arc::new(Mutex::new(Vec::new()));
//!
//! let mediator = DefaultMediator::builder()
//!     .add_handler(AskFavoriteHandler(service.clone()))
//!     .subscribe(Barista(orders.clone()))
//!     .try_build()
//!     .unwrap();
//!
//! futures::executor::block_on(async {
//!     let drink = mediator.send(AskFavorite).await.unwrap();
//!     assert_eq!(drink, Drink("Macchiato".to_owned()));
//!
//!     mediator.publish(BreakStarted(drink)).await.unwrap();
//! });
//!
//! assert_eq!(*orders.lock().unwrap(), vec![Drink("Macchiato".to_owned())]);
//! ```

/// A convenient result type.
pub type Result<T> = std::result::Result<T, error::Error>;

pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;

/// Module for the mediator request-response.
mod request;
pub use request::*;

/// Module for the mediator notifications.
mod notification;
pub use notification::*;

/// Module for the errors.
mod error;
pub use error::*;

/// Module for the handler registry.
mod registry;
pub use registry::*;

/// Module for the mediator configuration.
mod config;
pub use config::*;

/// Module for the mediator.
mod mediator;
pub use crate::mediator::*;

/// Provides default implementations.
#[cfg(feature = "impls")]
mod impls;

#[cfg(feature = "impls")]
pub use impls::*;
