pub mod auth_service;
pub mod favorite_service;
pub mod menu_service;
pub mod notification_service;
pub mod order_service;
pub mod recipe_service;
pub mod restaurant_service;
pub mod review_service;
