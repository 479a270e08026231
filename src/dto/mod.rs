pub mod auth;
pub mod favorites;
pub mod menu;
pub mod notifications;
pub mod orders;
pub mod recipes;
pub mod restaurants;
pub mod reviews;
