mod events;
mod models;
mod queries;
mod service;

use crate::events::{Barista, BreakAnnouncer, BreakStarted};
use crate::models::Drink;
use crate::queries::{AskFavorite, AskFavoriteHandler};
use crate::service::DrinkService;
use anyhow::Context;
use chrono::NaiveTime;
use message_hub::{CancellationToken, DefaultMediator, Mediator, MediatorConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = MediatorConfig::from_env()?;
    let service = Arc::new(DrinkService::new(Drink::new("Macchiato")));
    let orders = Arc::new(AtomicUsize::new(0));

    let mediator = DefaultMediator::builder()
        .with_config(config)
        // Requests
        .add_handler(AskFavoriteHandler(service.clone()))
        // Notifications
        .subscribe(BreakAnnouncer)
        .subscribe(Barista(orders.clone()))
        .try_build()?;

    let drink = mediator.send(AskFavorite).await?;
    log::info!("Favorite drink: {}", drink.name());

    let time = NaiveTime::from_hms_opt(9, 30, 0).context("invalid break time")?;
    mediator
        .publish(BreakStarted {
            time,
            drink_name: drink.name().to_owned(),
        })
        .await?;

    // Nobody is around after closing time.
    let closed = CancellationToken::new();
    closed.cancel();
    mediator
        .publish_with_cancel(
            BreakStarted {
                time: NaiveTime::from_hms_opt(18, 0, 0).context("invalid break time")?,
                drink_name: drink.name().to_owned(),
            },
            closed,
        )
        .await?;

    log::info!("Drinks prepared: {}", orders.load(Ordering::SeqCst));
    Ok(())
}
