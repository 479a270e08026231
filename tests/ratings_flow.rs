use axum_food_delivery_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::recipes::{CreateRecipeRequest, RateRecipeRequest},
    dto::reviews::CreateReviewRequest,
    entity::{restaurants::ActiveModel as RestaurantActive, users::ActiveModel as UserActive},
    middleware::auth::AuthUser,
    models::Instruction,
    routes::params::Pagination,
    services::{recipe_service, restaurant_service, review_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

// Integration flow: reviews drive the restaurant's stored average, recipe
// ratings drive the recipe's, and emptying the rating set resets the
// aggregate to the no-rating sentinel.
#[tokio::test]
async fn reviews_and_ratings_recompute_stored_aggregates() -> anyhow::Result<()> {
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
    let alice_id = create_user(&state, "user", "alice@example.com").await?;
    let bob_id = create_user(&state, "user", "bob@example.com").await?;
    let carol_id = create_user(&state, "user", "carol@example.com").await?;

    let alice = AuthUser {
        user_id: alice_id,
        role: "user".into(),
    };
    let bob = AuthUser {
        user_id: bob_id,
        role: "user".into(),
    };
    let carol = AuthUser {
        user_id: carol_id,
        role: "user".into(),
    };

    let restaurant = RestaurantActive {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id),
        name: Set("Aggregate Cafe".into()),
        description: Set(None),
        address: Set("3 Mean Street".into()),
        phone: Set(None),
        delivery_fee: Set(0),
        rating: Set(None),
        review_count: NotSet,
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    // A new restaurant carries the no-rating sentinel.
    let fresh = restaurant_service::get_restaurant(&state, restaurant.id).await?;
    let fresh = fresh.data.unwrap();
    assert_eq!(fresh.rating, None);
    assert_eq!(fresh.review_count, 0);

    review_service::create_review(
        &state,
        &alice,
        restaurant.id,
        CreateReviewRequest {
            rating: 5,
            comment: Some("Great".into()),
        },
    )
    .await?;
    review_service::create_review(
        &state,
        &bob,
        restaurant.id,
        CreateReviewRequest {
            rating: 4,
            comment: None,
        },
    )
    .await?;

    let rated = restaurant_service::get_restaurant(&state, restaurant.id).await?;
    let rated = rated.data.unwrap();
    assert_eq!(rated.rating, Some(4.5));
    assert_eq!(rated.review_count, 2);

    // One review per user per restaurant.
    let duplicate = review_service::create_review(
        &state,
        &alice,
        restaurant.id,
        CreateReviewRequest {
            rating: 1,
            comment: None,
        },
    )
    .await;
    assert!(duplicate.is_err(), "second review from same user must be rejected");

    // Deleting a review recomputes the stored average.
    let reviews = review_service::list_reviews(
        &state,
        restaurant.id,
        Pagination {
            page: None,
            per_page: None,
        },
    )
    .await?;
    let bobs = reviews
        .data
        .unwrap()
        .items
        .into_iter()
        .find(|r| r.user_id == bob_id)
        .expect("bob's review");
    review_service::delete_review(&state, &bob, restaurant.id, bobs.id).await?;

    let after_delete = restaurant_service::get_restaurant(&state, restaurant.id).await?;
    let after_delete = after_delete.data.unwrap();
    assert_eq!(after_delete.rating, Some(5.0));
    assert_eq!(after_delete.review_count, 1);

    // Only the author or an admin may delete a review; an admin deleting the
    // last one resets the restaurant to the no-rating sentinel.
    let admin_id = create_user(&state, "admin", "admin@example.com").await?;
    let admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };
    let remaining = review_service::list_reviews(
        &state,
        restaurant.id,
        Pagination {
            page: None,
            per_page: None,
        },
    )
    .await?;
    let alices = remaining
        .data
        .unwrap()
        .items
        .into_iter()
        .find(|r| r.user_id == alice_id)
        .expect("alice's review");

    let forbidden = review_service::delete_review(&state, &carol, restaurant.id, alices.id).await;
    assert!(forbidden.is_err(), "a stranger must not delete the review");

    review_service::delete_review(&state, &admin, restaurant.id, alices.id).await?;
    let emptied = restaurant_service::get_restaurant(&state, restaurant.id).await?;
    let emptied = emptied.data.unwrap();
    assert_eq!(emptied.rating, None);
    assert_eq!(emptied.review_count, 0);

    // Recipe ratings follow the same recompute-on-write rule.
    let recipe = recipe_service::create_recipe(
        &state,
        &alice,
        CreateRecipeRequest {
            title: "Test Toast".into(),
            description: None,
            ingredients: vec![],
            instructions: vec![Instruction {
                step: 1,
                description: "Toast the bread.".into(),
            }],
        },
    )
    .await?;
    let recipe = recipe.data.unwrap();
    assert_eq!(recipe.average_rating, None);

    recipe_service::rate_recipe(&state, &alice, recipe.id, RateRecipeRequest { score: 5 }).await?;
    recipe_service::rate_recipe(&state, &bob, recipe.id, RateRecipeRequest { score: 4 }).await?;
    let third =
        recipe_service::rate_recipe(&state, &carol, recipe.id, RateRecipeRequest { score: 5 })
            .await?;
    // (5 + 4 + 5) / 3 rounded to one decimal.
    assert_eq!(third.data.unwrap().average_rating, Some(4.7));

    // Re-rating upserts rather than adding a second row.
    let rerated =
        recipe_service::rate_recipe(&state, &bob, recipe.id, RateRecipeRequest { score: 1 })
            .await?;
    assert_eq!(rerated.data.unwrap().average_rating, Some(3.7));

    // Removing every rating resets the aggregate to the sentinel.
    recipe_service::unrate_recipe(&state, &alice, recipe.id).await?;
    recipe_service::unrate_recipe(&state, &bob, recipe.id).await?;
    let last = recipe_service::unrate_recipe(&state, &carol, recipe.id).await?;
    assert_eq!(last.data.unwrap().average_rating, None);

    // Unrating without a rating on file is a not-found.
    let missing = recipe_service::unrate_recipe(&state, &carol, recipe.id).await;
    assert!(missing.is_err(), "removing an absent rating must fail");

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
