use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::dto::restaurants::{CreateRestaurantRequest, RestaurantList, UpdateRestaurantRequest};
use crate::{
    audit::log_audit,
    entity::restaurants::{ActiveModel, Column, Entity as Restaurants, Model as RestaurantModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_owner},
    models::Restaurant,
    response::{ApiResponse, Meta},
    routes::params::{RestaurantQuery, RestaurantSortBy, SortOrder},
    state::AppState,
};

pub async fn list_restaurants(
    state: &AppState,
    query: RestaurantQuery,
) -> AppResult<ApiResponse<RestaurantList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(min_rating) = query.min_rating {
        condition = condition.add(Column::Rating.gte(min_rating));
    }

    let sort_by = query.sort_by.unwrap_or(RestaurantSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        RestaurantSortBy::CreatedAt => Column::CreatedAt,
        RestaurantSortBy::Rating => Column::Rating,
        RestaurantSortBy::Name => Column::Name,
    };

    let mut finder = Restaurants::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(restaurant_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = RestaurantList { items };
    Ok(ApiResponse::success("Restaurants", data, Some(meta)))
}

pub async fn get_restaurant(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Restaurant>> {
    let result = Restaurants::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(restaurant_from_entity);
    let result = match result {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Restaurant", result, None))
}

pub async fn create_restaurant(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    ensure_owner(user)?;
    if payload.delivery_fee < 0 {
        return Err(AppError::BadRequest("delivery_fee must not be negative".into()));
    }

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(user.user_id),
        name: Set(payload.name),
        description: Set(payload.description),
        address: Set(payload.address),
        phone: Set(payload.phone),
        delivery_fee: Set(payload.delivery_fee),
        rating: Set(None),
        review_count: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let restaurant = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "restaurant_create",
        Some("restaurants"),
        Some(serde_json::json!({ "restaurant_id": restaurant.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Restaurant created",
        restaurant_from_entity(restaurant),
        Some(Meta::empty()),
    ))
}

pub async fn update_restaurant(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    let existing = find_owned(state, user, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(address) = payload.address {
        active.address = Set(address);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(delivery_fee) = payload.delivery_fee {
        if delivery_fee < 0 {
            return Err(AppError::BadRequest("delivery_fee must not be negative".into()));
        }
        active.delivery_fee = Set(delivery_fee);
    }
    active.updated_at = Set(Utc::now().into());

    let restaurant = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "restaurant_update",
        Some("restaurants"),
        Some(serde_json::json!({ "restaurant_id": restaurant.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        restaurant_from_entity(restaurant),
        Some(Meta::empty()),
    ))
}

pub async fn delete_restaurant(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    find_owned(state, user, id).await?;

    let result = Restaurants::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "restaurant_delete",
        Some("restaurants"),
        Some(serde_json::json!({ "restaurant_id": id })),
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

/// Load a restaurant and verify the caller owns it (admins pass).
pub async fn find_owned(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<RestaurantModel> {
    let restaurant = Restaurants::find_by_id(id).one(&state.orm).await?;
    let restaurant = match restaurant {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    if restaurant.owner_id != user.user_id && ensure_admin(user).is_err() {
        return Err(AppError::Forbidden);
    }
    Ok(restaurant)
}

pub fn restaurant_from_entity(model: RestaurantModel) -> Restaurant {
    Restaurant {
        id: model.id,
        owner_id: model.owner_id,
        name: model.name,
        description: model.description,
        address: model.address,
        phone: model.phone,
        delivery_fee: model.delivery_fee,
        rating: model.rating,
        review_count: model.review_count,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
