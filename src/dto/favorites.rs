use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Restaurant;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddFavoriteRequest {
    pub restaurant_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteRestaurantList {
    pub items: Vec<Restaurant>,
}
