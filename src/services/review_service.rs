use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::dto::reviews::{CreateReviewRequest, ReviewList};
use crate::{
    aggregate,
    audit::log_audit,
    entity::restaurants::{
        ActiveModel as RestaurantActive, Entity as Restaurants, Model as RestaurantModel,
    },
    entity::reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews, Model as ReviewModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Review,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::notification_service,
    state::AppState,
};

pub async fn list_reviews(
    state: &AppState,
    restaurant_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Reviews::find()
        .filter(ReviewCol::RestaurantId.eq(restaurant_id))
        .order_by_desc(ReviewCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(review_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest("rating must be between 1 and 5".into()));
    }

    let txn = state.orm.begin().await?;

    let restaurant = lock_restaurant(&txn, restaurant_id).await?;

    let existing = Reviews::find()
        .filter(
            Condition::all()
                .add(ReviewCol::RestaurantId.eq(restaurant_id))
                .add(ReviewCol::UserId.eq(user.user_id)),
        )
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "You already reviewed this restaurant".into(),
        ));
    }

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant_id),
        user_id: Set(user.user_id),
        rating: Set(payload.rating),
        comment: Set(payload.comment),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let owner_id = restaurant.owner_id;
    recompute_restaurant_rating(&txn, restaurant).await?;

    txn.commit().await?;

    if let Err(err) = notification_service::notify(
        &state.pool,
        owner_id,
        "review",
        "Your restaurant received a new review",
        Some(restaurant_id),
        Some("restaurant"),
    )
    .await
    {
        tracing::warn!(error = %err, "notification failed");
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "review_create",
        Some("reviews"),
        Some(serde_json::json!({ "review_id": review.id, "restaurant_id": restaurant_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Review created",
        review_from_entity(review),
        Some(Meta::empty()),
    ))
}

pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    review_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;

    let restaurant = lock_restaurant(&txn, restaurant_id).await?;

    let review = Reviews::find_by_id(review_id)
        .filter(ReviewCol::RestaurantId.eq(restaurant_id))
        .one(&txn)
        .await?;
    let review = match review {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    if review.user_id != user.user_id && ensure_admin(user).is_err() {
        return Err(AppError::Forbidden);
    }

    Reviews::delete_by_id(review_id).exec(&txn).await?;

    recompute_restaurant_rating(&txn, restaurant).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "review_delete",
        Some("reviews"),
        Some(serde_json::json!({ "review_id": review_id, "restaurant_id": restaurant_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn lock_restaurant<C: ConnectionTrait>(
    conn: &C,
    restaurant_id: Uuid,
) -> AppResult<RestaurantModel> {
    let restaurant = Restaurants::find_by_id(restaurant_id)
        .lock(LockType::Update)
        .one(conn)
        .await?;
    match restaurant {
        Some(r) => Ok(r),
        None => Err(AppError::NotFound),
    }
}

/// Recompute the restaurant's derived rating and review count from the
/// current review set. Runs inside the caller's transaction so the child
/// mutation and the aggregate land together.
async fn recompute_restaurant_rating<C: ConnectionTrait>(
    conn: &C,
    restaurant: RestaurantModel,
) -> AppResult<()> {
    let ratings: Vec<i16> = Reviews::find()
        .filter(ReviewCol::RestaurantId.eq(restaurant.id))
        .all(conn)
        .await?
        .into_iter()
        .map(|r| r.rating)
        .collect();

    let count = ratings.len() as i32;
    let mean = aggregate::mean_rating(&ratings);

    let mut active: RestaurantActive = restaurant.into();
    active.rating = Set(mean);
    active.review_count = Set(count);
    active.updated_at = Set(Utc::now().into());
    active.update(conn).await?;

    Ok(())
}

fn review_from_entity(model: ReviewModel) -> Review {
    Review {
        id: model.id,
        restaurant_id: model.restaurant_id,
        user_id: model.user_id,
        rating: model.rating,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
