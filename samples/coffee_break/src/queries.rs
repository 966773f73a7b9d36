use crate::models::Drink;
use crate::service::SharedDrinkService;
use message_hub::{CancellationToken, Request, RequestHandler};

pub struct AskFavorite;
impl Request<Drink> for AskFavorite {}

pub struct AskFavoriteHandler(pub SharedDrinkService);

#[message_hub::async_trait]
impl RequestHandler<AskFavorite, Drink> for AskFavoriteHandler {
    async fn handle(&self, _: AskFavorite, _: CancellationToken) -> Drink {
        self.0.favorite().await
    }
}
