use crate::models::Drink;
use std::sync::Arc;
use std::time::Duration;

pub type SharedDrinkService = Arc<DrinkService>;

#[derive(Debug, Clone)]
pub struct DrinkService {
    favorite: Drink,
}

impl DrinkService {
    pub fn new(favorite: Drink) -> DrinkService {
        DrinkService { favorite }
    }

    /// Looks up the favorite drink, as slow as asking a colleague.
    pub async fn favorite(&self) -> Drink {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.favorite.clone()
    }
}
