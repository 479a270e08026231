use axum_food_delivery_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::orders::{PlaceOrderItem, PlaceOrderRequest, UpdateOrderStatusRequest},
    entity::{
        menu_items::ActiveModel as MenuItemActive, restaurants::ActiveModel as RestaurantActive,
        users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    models::OrderStatus,
    routes::params::OrderListQuery,
    routes::params::Pagination,
    services::order_service,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

// Integration flow: customer places an order from a menu, the owner walks
// it through the status progression, and illegal moves are rejected.
#[tokio::test]
async fn place_order_and_owner_status_flow() -> anyhow::Result<()> {
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

    let customer_id = create_user(&state, "user", "customer@example.com").await?;
    let owner_id = create_user(&state, "owner", "owner@example.com").await?;

    let customer = AuthUser {
        user_id: customer_id,
        role: "user".into(),
    };
    let owner = AuthUser {
        user_id: owner_id,
        role: "owner".into(),
    };

    let restaurant = RestaurantActive {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id),
        name: Set("Test Diner".into()),
        description: Set(None),
        address: Set("1 Test Street".into()),
        phone: Set(None),
        delivery_fee: Set(299),
        rating: Set(None),
        review_count: NotSet,
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let burger = create_menu_item(&state, restaurant.id, "Burger", 1499).await?;
    let fries = create_menu_item(&state, restaurant.id, "Fries", 399).await?;

    // Place: 2 burgers + 4 fries, 8% tax on the 45.94 subtotal, 2.99 delivery.
    let placed = order_service::place_order(
        &state,
        &customer,
        PlaceOrderRequest {
            restaurant_id: restaurant.id,
            items: vec![
                PlaceOrderItem {
                    menu_item_id: burger.id,
                    quantity: 2,
                    notes: None,
                },
                PlaceOrderItem {
                    menu_item_id: fries.id,
                    quantity: 4,
                    notes: Some("extra ketchup".into()),
                },
            ],
            delivery_address: "2 Delivery Lane".into(),
            delivery_instructions: None,
        },
    )
    .await?;
    let placed = placed.data.unwrap();
    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert_eq!(placed.order.subtotal, 4594);
    assert_eq!(placed.order.tax, 367);
    assert_eq!(placed.order.delivery_fee, 299);
    assert_eq!(placed.order.total, 5260);
    assert_eq!(placed.items.len(), 2);
    assert!(placed.order.order_number.starts_with("ORD-"));

    // Stored unit prices are snapshots of the menu rows.
    let burger_line = placed
        .items
        .iter()
        .find(|i| i.menu_item_id == burger.id)
        .expect("burger line");
    assert_eq!(burger_line.price, 1499);
    assert_eq!(burger_line.quantity, 2);

    // Owner advances the order through the full progression.
    for next in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
    ] {
        let updated = order_service::update_order_status(
            &state,
            &owner,
            placed.order.id,
            UpdateOrderStatusRequest { status: next },
        )
        .await?;
        assert_eq!(updated.data.unwrap().status, next);
    }

    // Delivered is terminal except for a refund.
    let illegal = order_service::update_order_status(
        &state,
        &owner,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Preparing,
        },
    )
    .await;
    assert!(illegal.is_err(), "delivered -> preparing must be rejected");

    let refunded = order_service::update_order_status(
        &state,
        &owner,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Refunded,
        },
    )
    .await?;
    assert_eq!(refunded.data.unwrap().status, OrderStatus::Refunded);

    // A fresh pending order can still be cancelled by the customer.
    let second = order_service::place_order(
        &state,
        &customer,
        PlaceOrderRequest {
            restaurant_id: restaurant.id,
            items: vec![PlaceOrderItem {
                menu_item_id: burger.id,
                quantity: 1,
                notes: None,
            }],
            delivery_address: "2 Delivery Lane".into(),
            delivery_instructions: None,
        },
    )
    .await?;
    let second = second.data.unwrap().order;

    let cancelled = order_service::cancel_order(&state, &customer, second.id).await?;
    assert_eq!(cancelled.data.unwrap().status, OrderStatus::Cancelled);

    // Customer listing shows both orders; the owner dashboard sees them too.
    let listed = order_service::list_orders(
        &state,
        &customer,
        OrderListQuery {
            pagination: Pagination {
                page: None,
                per_page: None,
            },
            status: None,
            sort_order: None,
        },
    )
    .await?;
    assert_eq!(listed.data.unwrap().items.len(), 2);

    let dashboard = order_service::list_restaurant_orders(
        &state,
        &owner,
        restaurant.id,
        OrderListQuery {
            pagination: Pagination {
                page: None,
                per_page: None,
            },
            status: Some("cancelled".into()),
            sort_order: None,
        },
    )
    .await?;
    assert_eq!(dashboard.data.unwrap().items.len(), 1);

    // Bad requests never reach the order tables.
    let empty = order_service::place_order(
        &state,
        &customer,
        PlaceOrderRequest {
            restaurant_id: Uuid::new_v4(),
            items: vec![],
            delivery_address: "Somewhere".into(),
            delivery_instructions: None,
        },
    )
    .await;
    assert!(empty.is_err(), "empty item list must be rejected");

    let unknown_restaurant = order_service::place_order(
        &state,
        &customer,
        PlaceOrderRequest {
            restaurant_id: Uuid::new_v4(),
            items: vec![PlaceOrderItem {
                menu_item_id: Uuid::new_v4(),
                quantity: 1,
                notes: None,
            }],
            delivery_address: "Somewhere".into(),
            delivery_instructions: None,
        },
    )
    .await;
    assert!(unknown_restaurant.is_err(), "unknown restaurant must be rejected");

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

async fn create_menu_item(
    state: &AppState,
    restaurant_id: Uuid,
    name: &str,
    price: i64,
) -> anyhow::Result<axum_food_delivery_api::entity::menu_items::Model> {
    let item = MenuItemActive {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant_id),
        name: Set(name.into()),
        description: Set(None),
        price: Set(price),
        category: Set(None),
        available: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(item)
}
