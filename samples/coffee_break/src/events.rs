use chrono::NaiveTime;
use message_hub::{CancellationToken, HandlerResult, Notification, NotificationHandler};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct BreakStarted {
    pub time: NaiveTime,
    pub drink_name: String,
}
impl Notification for BreakStarted {}

pub struct BreakAnnouncer;

#[message_hub::async_trait]
impl NotificationHandler<BreakStarted> for BreakAnnouncer {
    async fn handle(&self, event: BreakStarted, _: CancellationToken) -> HandlerResult {
        log::info!(
            "Break started at {}, time for a {}",
            event.time.format("%H:%M"),
            event.drink_name
        );
        Ok(())
    }
}

/// Counts the drinks to prepare.
pub struct Barista(pub Arc<AtomicUsize>);

#[message_hub::async_trait]
impl NotificationHandler<BreakStarted> for Barista {
    async fn handle(&self, event: BreakStarted, cancel: CancellationToken) -> HandlerResult {
        if cancel.is_cancelled() {
            log::warn!("Barista went home, no {} today", event.drink_name);
            return Ok(());
        }

        let orders = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        log::info!("Barista is preparing {} #{}", event.drink_name, orders);
        Ok(())
    }
}
