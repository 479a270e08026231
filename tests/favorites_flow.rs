use axum_food_delivery_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::favorites::AddFavoriteRequest,
    entity::{
        Favorites, Restaurants, Users, favorites::Column as FavoriteCol,
        restaurants::ActiveModel as RestaurantActive, users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    routes::params::Pagination,
    services::favorite_service,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, Set,
    Statement,
};
use uuid::Uuid;

// Integration flow: add a restaurant to favorites (idempotently), list it
// back through the join, walk the row's relations, and remove it.
#[tokio::test]
async fn add_list_and_remove_favorite_restaurant() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let owner_id = create_user(&state, "owner", "owner@example.com").await?;
    let user_id = create_user(&state, "user", "diner@example.com").await?;
    let user = AuthUser {
        user_id,
        role: "user".into(),
    };

    let restaurant = RestaurantActive {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id),
        name: Set("Favorite Spot".into()),
        description: Set(None),
        address: Set("4 Join Road".into()),
        phone: Set(None),
        delivery_fee: Set(0),
        rating: Set(None),
        review_count: NotSet,
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let first = favorite_service::add_favorite(
        &state.pool,
        &user,
        AddFavoriteRequest {
            restaurant_id: restaurant.id,
        },
    )
    .await?;
    let first = first.data.unwrap();

    // Adding the same restaurant again is a no-op that returns the same row.
    let again = favorite_service::add_favorite(
        &state.pool,
        &user,
        AddFavoriteRequest {
            restaurant_id: restaurant.id,
        },
    )
    .await?;
    assert_eq!(again.data.unwrap().id, first.id);

    let listed = favorite_service::list_favorites(
        &state.pool,
        &user,
        Pagination {
            page: None,
            per_page: None,
        },
    )
    .await?;
    let items = listed.data.unwrap().items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, restaurant.id);

    // The favorites row links back to both its user and its restaurant.
    let row = Favorites::find()
        .filter(FavoriteCol::UserId.eq(user_id))
        .one(&state.orm)
        .await?
        .expect("favorite row");
    let linked_user = row
        .find_related(Users)
        .one(&state.orm)
        .await?
        .expect("favorite's user");
    assert_eq!(linked_user.id, user_id);
    let linked_restaurant = row
        .find_related(Restaurants)
        .one(&state.orm)
        .await?
        .expect("favorite's restaurant");
    assert_eq!(linked_restaurant.id, restaurant.id);

    favorite_service::remove_favorite(&state.pool, &user, restaurant.id).await?;
    let removed_again = favorite_service::remove_favorite(&state.pool, &user, restaurant.id).await;
    assert!(removed_again.is_err(), "removing an absent favorite must fail");

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, recipe_ratings, recipe_likes, recipe_comments, recipes, reviews, favorites, notifications, audit_logs, menu_items, restaurants, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        tax_rate_bps: 800,
    };

    Ok(AppState { pool, orm, config })
}

async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        name: Set("Test".into()),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}
