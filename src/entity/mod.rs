pub mod audit_logs;
pub mod favorites;
pub mod menu_items;
pub mod notifications;
pub mod order_items;
pub mod orders;
pub mod recipe_comments;
pub mod recipe_likes;
pub mod recipe_ratings;
pub mod recipes;
pub mod restaurants;
pub mod reviews;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use favorites::Entity as Favorites;
pub use menu_items::Entity as MenuItems;
pub use notifications::Entity as Notifications;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use recipe_comments::Entity as RecipeComments;
pub use recipe_likes::Entity as RecipeLikes;
pub use recipe_ratings::Entity as RecipeRatings;
pub use recipes::Entity as Recipes;
pub use restaurants::Entity as Restaurants;
pub use reviews::Entity as Reviews;
pub use users::Entity as Users;
