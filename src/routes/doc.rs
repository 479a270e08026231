use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        favorites::{AddFavoriteRequest, FavoriteRestaurantList},
        menu::{CreateMenuItemRequest, MenuItemList, UpdateMenuItemRequest},
        notifications::NotificationList,
        orders::{OrderList, OrderWithItems, PlaceOrderItem, PlaceOrderRequest, UpdateOrderStatusRequest},
        recipes::{
            AddCommentRequest, CommentList, CreateRecipeRequest, RateRecipeRequest, RecipeDetail,
            RecipeList, UpdateRecipeRequest,
        },
        restaurants::{CreateRestaurantRequest, RestaurantList, UpdateRestaurantRequest},
        reviews::{CreateReviewRequest, ReviewList},
    },
    models::{
        Ingredient, Instruction, MenuItem, Notification, Order, OrderItem, OrderStatus, Recipe,
        RecipeComment, Restaurant, Review, User,
    },
    response::{ApiResponse, Meta},
    routes::{auth, favorites, health, notifications, orders, owner, params, recipes, restaurants},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        restaurants::list_restaurants,
        restaurants::get_restaurant,
        restaurants::create_restaurant,
        restaurants::update_restaurant,
        restaurants::delete_restaurant,
        restaurants::list_menu,
        restaurants::create_menu_item,
        restaurants::update_menu_item,
        restaurants::delete_menu_item,
        restaurants::list_reviews,
        restaurants::create_review,
        restaurants::delete_review,
        recipes::list_recipes,
        recipes::get_recipe,
        recipes::create_recipe,
        recipes::update_recipe,
        recipes::delete_recipe,
        recipes::rate_recipe,
        recipes::unrate_recipe,
        recipes::like_recipe,
        recipes::unlike_recipe,
        recipes::list_comments,
        recipes::add_comment,
        recipes::delete_comment,
        orders::list_orders,
        orders::place_order,
        orders::get_order,
        orders::cancel_order,
        owner::list_restaurant_orders,
        owner::update_order_status,
        favorites::list_favorites,
        favorites::add_favorite,
        favorites::remove_favorite,
        notifications::list_notifications,
        notifications::mark_read,
        notifications::mark_unread,
        notifications::mark_all_read
    ),
    components(
        schemas(
            User,
            Restaurant,
            MenuItem,
            Order,
            OrderItem,
            OrderStatus,
            Recipe,
            Ingredient,
            Instruction,
            RecipeComment,
            Review,
            Notification,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateRestaurantRequest,
            UpdateRestaurantRequest,
            RestaurantList,
            CreateMenuItemRequest,
            UpdateMenuItemRequest,
            MenuItemList,
            PlaceOrderItem,
            PlaceOrderRequest,
            UpdateOrderStatusRequest,
            OrderWithItems,
            OrderList,
            CreateRecipeRequest,
            UpdateRecipeRequest,
            RateRecipeRequest,
            AddCommentRequest,
            RecipeList,
            RecipeDetail,
            CommentList,
            CreateReviewRequest,
            ReviewList,
            AddFavoriteRequest,
            FavoriteRestaurantList,
            NotificationList,
            params::Pagination,
            params::RestaurantQuery,
            params::RecipeQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Restaurant>,
            ApiResponse<RestaurantList>,
            ApiResponse<Recipe>,
            ApiResponse<RecipeList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<NotificationList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Restaurants", description = "Restaurant endpoints"),
        (name = "Menu", description = "Menu item endpoints"),
        (name = "Reviews", description = "Restaurant review endpoints"),
        (name = "Recipes", description = "Recipe sharing endpoints"),
        (name = "Orders", description = "Customer order endpoints"),
        (name = "Owner", description = "Restaurant owner endpoints"),
        (name = "Favorites", description = "Favorite restaurant endpoints"),
        (name = "Notifications", description = "Notification endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
