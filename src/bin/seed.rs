use argon2::{
    Argon2, PasswordHasher,
    password_hash::{rand_core::OsRng, SaltString},
};
use axum_food_delivery_api::{
    config::AppConfig,
    db::create_pool,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_account(&pool, "admin@example.com", "Admin", "admin123", "admin").await?;
    let owner_id = ensure_account(&pool, "owner@example.com", "Olive Owner", "owner123", "owner").await?;
    let user_id = ensure_account(&pool, "user@example.com", "Uma User", "user123", "user").await?;

    let restaurant_id = seed_restaurant(&pool, owner_id).await?;
    seed_menu(&pool, restaurant_id).await?;
    seed_recipe(&pool, user_id).await?;

    println!("Seed completed. Admin: {admin_id}, Owner: {owner_id}, User: {user_id}");
    Ok(())
}

async fn ensure_account(
    pool: &sqlx::PgPool,
    email: &str,
    name: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, name, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_restaurant(pool: &sqlx::PgPool, owner_id: Uuid) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM restaurants WHERE name = $1 AND owner_id = $2")
            .bind("Ferris Diner")
            .bind(owner_id)
            .fetch_optional(pool)
            .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO restaurants (id, owner_id, name, description, address, phone, delivery_fee)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner_id)
    .bind("Ferris Diner")
    .bind("Comfort food, quick delivery")
    .bind("1 Crab Street")
    .bind("+1-555-0100")
    .bind(299_i64)
    .fetch_one(pool)
    .await?;

    println!("Seeded restaurant");
    Ok(row.0)
}

async fn seed_menu(pool: &sqlx::PgPool, restaurant_id: Uuid) -> anyhow::Result<()> {
    let items = vec![
        ("Classic Burger", "Beef patty, cheddar, pickles", 1499_i64, "mains"),
        ("Garlic Fries", "Hand cut, extra garlic", 399, "sides"),
        ("Margherita Pizza", "Tomato, mozzarella, basil", 1250, "mains"),
        ("Lemonade", "Fresh squeezed", 350, "drinks"),
    ];

    for (name, desc, price, category) in items {
        let exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM menu_items WHERE restaurant_id = $1 AND name = $2")
                .bind(restaurant_id)
                .bind(name)
                .fetch_optional(pool)
                .await?;
        if exists.is_some() {
            continue;
        }
        sqlx::query(
            r#"
            INSERT INTO menu_items (id, restaurant_id, name, description, price, category)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(restaurant_id)
        .bind(name)
        .bind(desc)
        .bind(price)
        .bind(category)
        .execute(pool)
        .await?;
    }

    println!("Seeded menu items");
    Ok(())
}

async fn seed_recipe(pool: &sqlx::PgPool, author_id: Uuid) -> anyhow::Result<()> {
    let exists: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM recipes WHERE author_id = $1 AND title = $2")
            .bind(author_id)
            .bind("Weeknight Carbonara")
            .fetch_optional(pool)
            .await?;
    if exists.is_some() {
        return Ok(());
    }

    let ingredients = serde_json::json!([
        { "name": "Spaghetti", "quantity": "400", "unit": "g", "notes": null },
        { "name": "Guanciale", "quantity": "150", "unit": "g", "notes": "or pancetta" },
        { "name": "Eggs", "quantity": "3", "unit": "pcs", "notes": null },
        { "name": "Pecorino", "quantity": "60", "unit": "g", "notes": "grated" }
    ]);
    let instructions = serde_json::json!([
        { "step": 1, "description": "Boil the pasta in salted water." },
        { "step": 2, "description": "Render the guanciale until crisp." },
        { "step": 3, "description": "Whisk eggs with pecorino, toss off heat." }
    ]);

    sqlx::query(
        r#"
        INSERT INTO recipes (id, author_id, title, description, ingredients, instructions)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(author_id)
    .bind("Weeknight Carbonara")
    .bind("Fifteen minutes, four ingredients")
    .bind(ingredients)
    .bind(instructions)
    .execute(pool)
    .await?;

    println!("Seeded recipe");
    Ok(())
}
