use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod doc;
pub mod favorites;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod owner;
pub mod params;
pub mod recipes;
pub mod restaurants;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/restaurants", restaurants::router())
        .nest("/recipes", recipes::router())
        .nest("/orders", orders::router())
        .nest("/owner", owner::router())
        .nest("/favorites", favorites::router())
        .nest("/notifications", notifications::router())
}
